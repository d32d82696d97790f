//! Command-line front end

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use likewise::{
    models::{CatalogItem, Category, EventKind, ItemId, RegisterRequest},
    services::{LikeState, SearchState, Suggestion},
    Config, Session,
};

#[derive(Debug, Parser)]
#[command(name = "likewise", version, about = "Search titles and manage liked items")]
pub struct Cli {
    /// Active category (film, serial, ksiazka, "filmy i seriale", ksiazki, tv, book)
    #[arg(long, short = 'c', global = true, env = "LIKEWISE_CATEGORY")]
    pub category: Option<Category>,

    /// Access token; overrides LIKEWISE_ACCESS_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up one title
    Search { title: String },
    /// Search as you type: each stdin line is the full current input
    Type,
    /// List liked items in the active category
    Liked,
    /// Like an item
    Like { id: String },
    /// Remove an item from the liked list
    Unlike { id: String },
    /// Personalized suggestions
    Suggest {
        #[arg(long)]
        user_id: Option<u64>,
    },
    /// Report a reaction to a shown suggestion
    Feedback(FeedbackArgs),
    /// Home page rows
    Home,
    /// Log in and print the issued token
    Login {
        username: String,
        #[arg(long, env = "LIKEWISE_PASSWORD")]
        password: String,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Recommender health
    Health,
}

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    pub id: String,
    #[arg(long)]
    pub user_id: u64,
    /// Reaction: like or dislike
    #[arg(long, default_value = "like")]
    pub event: String,
    #[arg(long)]
    pub score: Option<f64>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long, env = "LIKEWISE_PASSWORD")]
    pub password: String,
    #[arg(long, default_value = "")]
    pub email: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub birthday: String,
    #[arg(long, default_value = "")]
    pub gender: String,
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(token) = &self.token {
            config.access_token = Some(token.clone());
        }
        Ok(config)
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let session = Session::from_config(&config).context("Failed to build HTTP client")?;
    if let Some(category) = cli.category {
        session.select_category(category);
    }

    let format = cli.format;
    let result = match cli.command {
        Commands::Search { title } => search(&session, &title, format).await,
        Commands::Type => type_ahead(&session, format).await,
        Commands::Liked => liked(&session, format).await,
        Commands::Like { id } => set_liked(&session, &id, true).await,
        Commands::Unlike { id } => set_liked(&session, &id, false).await,
        Commands::Suggest { user_id } => suggest(&session, user_id, format).await,
        Commands::Feedback(args) => feedback(&session, args).await,
        Commands::Home => home(&session, format).await,
        Commands::Login { username, password } => login(&session, &username, &password).await,
        Commands::Register(args) => register(&session, args).await,
        Commands::Health => health(&session, format).await,
    };

    session.shutdown();
    result
}

async fn search(session: &Session, title: &str, format: OutputFormat) -> Result<()> {
    let state = session.search().resolve(title, session.category()).await;
    print_search_state(&state, session.category(), format)
}

async fn type_ahead(session: &Session, format: OutputFormat) -> Result<()> {
    let search = session.search_session();
    let mut view = session.search().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => search.input(line),
                None => break,
            },
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = view.borrow_and_update().clone();
                if !state.is_loading() {
                    print_search_state(&state, session.category(), format)?;
                }
            }
        }
    }

    search.shutdown();
    Ok(())
}

async fn liked(session: &Session, format: OutputFormat) -> Result<()> {
    if !session.is_logged_in() {
        anyhow::bail!("Log in first or pass --token");
    }

    session.sync_liked().finished().await;
    let view = session.liked().view();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view.items)?),
        OutputFormat::Text => {
            if view.items.is_empty() {
                println!("No liked items in {}", view.category);
                return Ok(());
            }
            println!("Liked {} ({}):", view.category, view.items.len());
            for item in &view.items {
                println!("  {}", describe(item, view.category));
            }
        }
    }
    Ok(())
}

async fn set_liked(session: &Session, id: &str, liked: bool) -> Result<()> {
    let id = ItemId::new(id);
    if session.is_logged_in() {
        session.sync_liked().finished().await;
    }

    let state = session
        .set_liked(&id, liked)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match state {
        LikeState::ConfirmedLiked => println!("Liked {}", id),
        LikeState::ConfirmedUnliked => println!("Not liked: {}", id),
        pending => println!("{}: {:?}", id, pending),
    }
    Ok(())
}

async fn suggest(session: &Session, user_id: Option<u64>, format: OutputFormat) -> Result<()> {
    let suggestions = session
        .suggestions(user_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = suggestions.iter().map(|s| &s.item).collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => print_suggestions(&suggestions),
    }
    Ok(())
}

async fn feedback(session: &Session, args: FeedbackArgs) -> Result<()> {
    let event = match args.event.as_str() {
        "like" => EventKind::Like,
        "dislike" => EventKind::Dislike,
        other => anyhow::bail!("Unknown event: {}", other),
    };

    session
        .feedback(args.user_id, &ItemId::new(args.id), event, args.score)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("Feedback sent");
    Ok(())
}

async fn home(session: &Session, format: OutputFormat) -> Result<()> {
    let feed = session.home().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&feed)?),
        OutputFormat::Text => {
            println!("{}:", Category::Video);
            for item in &feed.shows {
                println!("  {}", describe(item, Category::Video));
            }
            println!("{}:", Category::Books);
            for item in &feed.books {
                println!("  {}", describe(item, Category::Books));
            }
        }
    }
    Ok(())
}

async fn login(session: &Session, username: &str, password: &str) -> Result<()> {
    let response = session
        .login(username, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let message = response.message_text();
    if !message.is_empty() {
        println!("{}", message);
    }
    if let Some(token) = session.token() {
        println!("LIKEWISE_ACCESS_TOKEN={}", token.as_str());
    }
    Ok(())
}

async fn register(session: &Session, args: RegisterArgs) -> Result<()> {
    let request = RegisterRequest {
        username: args.username,
        password: args.password,
        email: args.email,
        birthday: args.birthday,
        gender: args.gender,
    };

    let response = session
        .register(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let message = response.message_text();
    println!("{}", if message.is_empty() { "Registered" } else { message.as_str() });
    if let Some(token) = session.token() {
        println!("LIKEWISE_ACCESS_TOKEN={}", token.as_str());
    }
    Ok(())
}

async fn health(session: &Session, format: OutputFormat) -> Result<()> {
    let status = session.health().await.context("Recommender unreachable")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => println!(
            "{} {} {}",
            status.status,
            status.service.as_deref().unwrap_or("-"),
            status.version.as_deref().unwrap_or("-")
        ),
    }
    Ok(())
}

fn print_search_state(state: &SearchState, category: Category, format: OutputFormat) -> Result<()> {
    match (state, format) {
        (SearchState::Found(item), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(item)?)
        }
        (SearchState::Found(item), OutputFormat::Text) => println!("{}", describe(item, category)),
        (SearchState::Failed(message), _) => println!("{}", message),
        (SearchState::Empty, _) | (SearchState::Loading { .. }, _) => {}
    }
    Ok(())
}

fn print_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions");
        return;
    }
    for suggestion in suggestions {
        println!(
            "  {:.2}  {}",
            suggestion.score,
            describe(&suggestion.item, suggestion.category)
        );
    }
}

fn describe(item: &CatalogItem, category: Category) -> String {
    let id = item
        .item_id(category)
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut line = format!("[{}] {}", id, item.title);
    if let Some(year) = item.release_year() {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(rating) = item.display_rating() {
        line.push_str(&format!(" ★ {:.1}", rating));
    }
    if !item.authors.is_empty() {
        line.push_str(&format!(" by {}", item.authors.join(", ")));
    }
    line
}
