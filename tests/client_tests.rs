use std::sync::Arc;

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use likewise::{
    error::{CONNECTION_MESSAGE, NOT_FOUND_MESSAGE},
    models::{AccessToken, Category, EventKind, ItemId},
    services::{
        providers::{
            AuthProvider, CatalogProvider, HttpAuthProvider, HttpCatalogProvider,
            HttpRecommendationProvider,
        },
        LikeState, SearchState,
    },
    ClientError, Config, Session,
};

fn config_for(catalog: &MockServer, auth: &MockServer, token: Option<&str>) -> Config {
    Config {
        catalog_url: catalog.uri(),
        auth_url: auth.uri(),
        recommender_url: catalog.uri(),
        access_token: token.map(str::to_string),
        ..Config::default()
    }
}

#[tokio::test]
async fn search_returns_item_for_category() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/tv/title/Interstellar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {
                "movie_id": 157336,
                "title": "Interstellar",
                "release_date": "2014-11-05",
                "rating": 8.4,
                "genres": [{"id": 12, "name": "Adventure"}]
            }
        })))
        .expect(1)
        .mount(&catalog)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, None)).unwrap();
    session.select_category(Category::Video);

    match session.search().resolve("Interstellar", Category::Video).await {
        SearchState::Found(item) => {
            assert_eq!(item.item_id(Category::Video), Some(&ItemId::new("157336")));
            assert_eq!(item.release_year(), Some(2014));
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn search_maps_not_found_and_server_errors() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/book/title/Nothing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/book/title/Broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&catalog)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, None)).unwrap();

    assert_eq!(
        session.search().resolve("Nothing", Category::Books).await,
        SearchState::Failed(NOT_FOUND_MESSAGE.to_string())
    );
    assert_eq!(
        session.search().resolve("Broken", Category::Books).await,
        SearchState::Failed(CONNECTION_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn unreachable_catalog_is_a_connection_error() {
    let session = Session::from_config(&Config {
        catalog_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    })
    .unwrap();

    assert_eq!(
        session.search().resolve("Dune", Category::Books).await,
        SearchState::Failed(CONNECTION_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn liked_list_drops_failed_lookups() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/pull"))
        .and(body_json(json!({"access_token": "abc", "event": "like", "type": "book"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"items": [
                {"id": 1, "type": "book", "name": "like"},
                {"id": 2, "type": "book", "name": "like"},
                {"id": 1, "type": "book", "name": "like"}
            ]}
        })))
        .expect(1)
        .mount(&auth)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/api/book/id/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"id": 1, "title": "Solaris", "authors": "Stanisław Lem"}
        })))
        .expect(1)
        .mount(&catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/book/id/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&catalog)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, Some("abc"))).unwrap();
    session.select_category(Category::Books);
    session.sync_liked().finished().await;

    let view = session.liked().view();
    assert!(!view.loading);
    assert_eq!(view.ids, vec![ItemId::new("1"), ItemId::new("2")]);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].title, "Solaris");
    assert_eq!(view.items[0].authors, vec!["Stanisław Lem".to_string()]);
}

#[tokio::test]
async fn null_pull_items_mean_nothing_liked() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/pull"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": {"items": null}})),
        )
        .mount(&auth)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, Some("abc"))).unwrap();
    session.sync_liked().finished().await;

    assert!(session.liked().view().items.is_empty());
    assert!(catalog.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn like_pushes_event_and_accepts_redirect() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": {"items": []}})))
        .mount(&auth)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/event/push"))
        .and(body_json(json!({
            "access_token": "abc",
            "event": "like",
            "type": "tv",
            "id": "42"
        })))
        .respond_with(ResponseTemplate::new(302))
        .expect(1)
        .mount(&auth)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/tv/id/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": {"movie_id": 42, "title": "Arrival"}})),
        )
        .expect(1)
        .mount(&catalog)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, Some("abc"))).unwrap();
    session.select_category(Category::Video);
    session.sync_liked().finished().await;

    let state = session.toggle_like(&ItemId::new("42")).await.unwrap();
    assert_eq!(state, LikeState::ConfirmedLiked);
    assert!(session.liked().is_liked(Category::Video, &ItemId::new("42")));
    let view = session.liked().view();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].title, "Arrival");
}

#[tokio::test]
async fn rejected_push_keeps_confirmed_membership() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/push"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&auth)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, Some("abc"))).unwrap();
    let mut notices = session.notices();

    let err = session.toggle_like(&ItemId::new("7")).await.unwrap_err();
    assert!(matches!(err, ClientError::Status(500)));
    assert_eq!(
        session.like_state(Category::Books, &ItemId::new("7")),
        LikeState::ConfirmedUnliked
    );
    assert_eq!(notices.recv().await.unwrap().message, CONNECTION_MESSAGE);
}

#[tokio::test]
async fn signed_out_like_never_reaches_the_server() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/push"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&auth)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, None)).unwrap();
    let err = session.toggle_like(&ItemId::new("7")).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
}

#[tokio::test]
async fn login_and_register_responses() {
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({"username": "ala", "password": "kot"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "message": "Zalogowano"
        })))
        .mount(&auth)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({"username": "ala", "password": "zle"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "access_token": "None",
            "message": "Niepoprawne hasło"
        })))
        .mount(&auth)
        .await;

    let provider = HttpAuthProvider::new(Client::new(), auth.uri());
    let ok = provider
        .login(&likewise::models::LoginRequest {
            username: "ala".into(),
            password: "kot".into(),
        })
        .await
        .unwrap();
    assert_eq!(ok.token().map(|t| t.as_str().to_string()), Some("tok-1".to_string()));

    let err = provider
        .login(&likewise::models::LoginRequest {
            username: "ala".into(),
            password: "zle".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Niepoprawne hasło");
}

#[tokio::test]
async fn title_is_sent_as_one_path_segment() {
    let catalog = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/tv/title/Star%20Wars:%20A%2FB"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": {"movie_id": 11, "title": "Star Wars"}})),
        )
        .expect(1)
        .mount(&catalog)
        .await;

    let provider = HttpCatalogProvider::new(Client::new(), catalog.uri());
    let item = provider
        .search_by_title(Category::Video, "Star Wars: A/B")
        .await
        .unwrap();
    assert_eq!(item.title, "Star Wars");
}

#[tokio::test]
async fn push_provider_sends_dislike_for_books() {
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/event/push"))
        .and(body_json(json!({
            "access_token": "abc",
            "event": "dislike",
            "type": "book",
            "id": "9"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&auth)
        .await;

    let provider: Arc<dyn AuthProvider> = Arc::new(HttpAuthProvider::new(Client::new(), auth.uri()));
    let token = AccessToken::parse("abc").unwrap();
    provider
        .push_event(&token, EventKind::Dislike, Category::Books, &ItemId::new("9"))
        .await
        .unwrap();
}

#[tokio::test]
async fn suggestions_and_home_feed() {
    let catalog = MockServer::start().await;
    let auth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ml/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 101, "type": "movie", "score": 0.95},
                {"id": 303, "type": "concert", "score": 0.88}
            ]
        })))
        .expect(1)
        .mount(&catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/tv/id/101"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": {"movie_id": 101, "title": "Arrival"}})),
        )
        .mount(&catalog)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/home/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"books": [{"id": 5, "title": "Solaris"}], "shows": null}
        })))
        .mount(&catalog)
        .await;

    let session = Session::from_config(&config_for(&catalog, &auth, None)).unwrap();

    let suggestions = session.suggestions(None).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].item.title, "Arrival");

    let home = session.home().await;
    assert_eq!(home.books.len(), 1);
    assert!(home.shows.is_empty());

    let health = HttpRecommendationProvider::new(Client::new(), "http://127.0.0.1:9".into());
    assert!(likewise::services::providers::RecommendationProvider::health(&health)
        .await
        .is_err());
}
