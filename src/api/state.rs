use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::{
    config::Config,
    error::{ClientError, ClientResult},
    models::{
        AccessToken, Category, CredentialsResponse, EventKind, HealthStatus, HomeFeed, ItemId,
        LoginRequest, RegisterRequest,
    },
    services::{
        providers::{
            AuthProvider, CatalogProvider, HttpAuthProvider, HttpCatalogProvider,
            HttpRecommendationProvider, RecommendationProvider,
        },
        CancelScope, LikeState, LikeToggler, LikedSetSynchronizer, Notice, SearchFetcher,
        SearchSession, Suggestion, SuggestionService, TaskHandle,
    },
};

/// Client session: the token and category every controller reacts to.
///
/// The session owns the only writable copy of the access token. Controllers
/// receive read-only subscriptions and restart their cycles on change.
pub struct Session {
    auth: Arc<dyn AuthProvider>,
    token: watch::Sender<Option<AccessToken>>,
    category: watch::Sender<Category>,
    root: CancelScope,
    debounce: Duration,
    search: SearchFetcher,
    liked: LikedSetSynchronizer,
    toggler: LikeToggler,
    suggestions: SuggestionService,
}

impl Session {
    /// Builds a session against the HTTP services named in `config`
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let http_client = config.http_client()?;

        let catalog = Arc::new(HttpCatalogProvider::new(
            http_client.clone(),
            config.catalog_url.clone(),
        ));
        let auth = Arc::new(HttpAuthProvider::new(
            http_client.clone(),
            config.auth_url.clone(),
        ));
        let recommender = Arc::new(HttpRecommendationProvider::new(
            http_client,
            config.recommender_url.clone(),
        ));

        Ok(Self::with_providers(catalog, auth, recommender, config))
    }

    pub fn with_providers(
        catalog: Arc<dyn CatalogProvider>,
        auth: Arc<dyn AuthProvider>,
        recommender: Arc<dyn RecommendationProvider>,
        config: &Config,
    ) -> Self {
        let root = CancelScope::root();
        let initial_token = config.access_token.clone().and_then(AccessToken::parse);
        let (token, token_rx) = watch::channel(initial_token);
        let (category, _) = watch::channel(Category::default());

        tracing::debug!(scope = %root.id(), "Session created");

        Self {
            search: SearchFetcher::new(catalog.clone(), &root),
            liked: LikedSetSynchronizer::new(auth.clone(), catalog.clone(), &root),
            toggler: LikeToggler::new(auth.clone(), token_rx),
            suggestions: SuggestionService::new(recommender, catalog, config.recommendation_limit),
            auth,
            token,
            category,
            root,
            debounce: config.debounce(),
        }
    }

    pub fn token(&self) -> Option<AccessToken> {
        self.token.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn subscribe_token(&self) -> watch::Receiver<Option<AccessToken>> {
        self.token.subscribe()
    }

    /// Logs in and stores the issued token
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<CredentialsResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.auth.login(&request).await?;

        match response.token() {
            Some(token) => {
                tracing::info!(username = %username, "Logged in");
                self.token.send_replace(Some(token));
                Ok(response)
            }
            None => Err(ClientError::Rejected(response.message_text())),
        }
    }

    /// Registers an account; the session changes only if a token is issued
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<CredentialsResponse> {
        let response = self.auth.register(request).await?;

        if let Some(token) = response.token() {
            tracing::info!(username = %request.username, "Registered and logged in");
            self.token.send_replace(Some(token));
        } else {
            tracing::info!(username = %request.username, "Registered; no session issued");
        }
        Ok(response)
    }

    pub fn logout(&self) {
        if self.token.send_replace(None).is_some() {
            tracing::info!("Logged out");
        }
    }

    pub fn category(&self) -> Category {
        *self.category.borrow()
    }

    pub fn subscribe_category(&self) -> watch::Receiver<Category> {
        self.category.subscribe()
    }

    /// Switches the active category; subscribed cycles restart
    pub fn select_category(&self, category: Category) {
        self.category.send_if_modified(|current| {
            if *current == category {
                false
            } else {
                tracing::debug!(from = %current.path_segment(), to = %category.path_segment(), "Category selected");
                *current = category;
                true
            }
        });
    }

    pub fn search(&self) -> &SearchFetcher {
        &self.search
    }

    /// Debounced search that follows the selected category
    pub fn search_session(&self) -> SearchSession {
        SearchSession::spawn(
            self.search.clone(),
            self.debounce,
            self.subscribe_category(),
            &self.root,
        )
    }

    pub fn liked(&self) -> &LikedSetSynchronizer {
        &self.liked
    }

    /// Keeps the liked list in sync with the token and category until shutdown
    pub fn start_liked_driver(&self) -> TaskHandle {
        self.liked
            .drive(self.subscribe_token(), self.subscribe_category())
    }

    /// One-off liked sync for the current token and category
    pub fn sync_liked(&self) -> TaskHandle {
        self.liked.sync(self.token(), self.category())
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.toggler.notices()
    }

    pub fn like_state(&self, category: Category, id: &ItemId) -> LikeState {
        match self.toggler.state(category, id) {
            Some(state) if state.is_pending() => state,
            _ => LikeState::confirmed(self.liked.is_liked(category, id)),
        }
    }

    /// Flips the liked membership of `id` in the active category
    pub async fn toggle_like(&self, id: &ItemId) -> ClientResult<LikeState> {
        let category = self.category();
        let currently_liked = self.liked.is_liked(category, id);
        self.push_toggle(category, id, currently_liked).await
    }

    /// Drives `id` to the requested membership.
    ///
    /// The event is always pushed: the local view may be empty because its
    /// pull failed, and the server treats a repeated event as a no-op.
    pub async fn set_liked(&self, id: &ItemId, liked: bool) -> ClientResult<LikeState> {
        self.push_toggle(self.category(), id, !liked).await
    }

    async fn push_toggle(
        &self,
        category: Category,
        id: &ItemId,
        currently_liked: bool,
    ) -> ClientResult<LikeState> {
        let state = self.toggler.toggle(category, id, currently_liked).await?;
        if !state.is_pending() {
            self.liked
                .apply_confirmed(category, id, state.is_liked())
                .await;
        }
        Ok(state)
    }

    /// Personalized suggestions from both liked sets.
    ///
    /// Signed out, the recommender gets an empty liked list.
    pub async fn suggestions(&self, user_id: Option<u64>) -> ClientResult<Vec<Suggestion>> {
        let liked = match self.token() {
            Some(token) => {
                let pulls = Category::ALL.map(|category| {
                    let auth = self.auth.clone();
                    let token = token.clone();
                    async move {
                        let ids = auth.pull_liked(&token, category).await.unwrap_or_else(|e| {
                            tracing::warn!(error = %e, category = %category.path_segment(), "Liked pull failed");
                            Vec::new()
                        });
                        (category, ids)
                    }
                });
                futures::future::join_all(pulls).await
            }
            None => Vec::new(),
        };

        self.suggestions.recommend(user_id, &liked).await
    }

    pub async fn home(&self) -> HomeFeed {
        self.suggestions.home().await
    }

    pub async fn feedback(
        &self,
        user_id: u64,
        id: &ItemId,
        event: EventKind,
        score_shown: Option<f64>,
    ) -> ClientResult<()> {
        self.suggestions
            .feedback(user_id, self.category(), id, event, score_shown)
            .await
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.suggestions.health().await
    }

    /// Cancels every cycle the session started
    pub fn shutdown(&self) {
        tracing::debug!(scope = %self.root.id(), "Session shutting down");
        self.root.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
