//! Collaborator service abstraction
//!
//! This module provides the HTTP seams of the client: one trait per external
//! service (catalog, auth, recommender), each with a reqwest-backed
//! implementation. Controllers only ever see the traits, so every
//! orchestration path can run against mocks.
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::{ClientError, ClientResult},
    models::{
        AccessToken, CatalogItem, Category, CredentialsResponse, EventKind, FeedbackRequest,
        HealthStatus, HomeFeed, ItemId, LoginRequest, RecommendRequest, RecommendResponse,
        RegisterRequest,
    },
};

pub mod auth;
pub mod catalog;
pub mod recommender;

pub use auth::HttpAuthProvider;
pub use catalog::HttpCatalogProvider;
pub use recommender::HttpRecommendationProvider;

/// Trait for the catalog service
///
/// Title search resolves to at most one item; detail lookups go by the
/// category-specific identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search one title in the category's catalog
    ///
    /// A not-found status maps to `ClientError::NotFound`.
    async fn search_by_title(&self, category: Category, query: &str) -> ClientResult<CatalogItem>;

    /// Fetch full details of one item
    async fn fetch_by_id(&self, category: Category, id: &ItemId) -> ClientResult<CatalogItem>;

    /// Fetch the home page suggestion rows
    async fn home_feed(&self) -> ClientResult<HomeFeed>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for the auth service: sessions and user events
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ClientResult<CredentialsResponse>;

    async fn register(&self, request: &RegisterRequest) -> ClientResult<CredentialsResponse>;

    /// Pull the identifiers the user currently likes in a category
    async fn pull_liked(&self, token: &AccessToken, category: Category)
        -> ClientResult<Vec<ItemId>>;

    /// Push a like/dislike event; success or a redirect-class status confirms it
    async fn push_event(
        &self,
        token: &AccessToken,
        event: EventKind,
        category: Category,
        id: &ItemId,
    ) -> ClientResult<()>;

    fn name(&self) -> &'static str;
}

/// Trait for the recommendation service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn recommend(&self, request: &RecommendRequest) -> ClientResult<RecommendResponse>;

    async fn feedback(&self, request: &FeedbackRequest) -> ClientResult<()>;

    async fn health(&self) -> ClientResult<HealthStatus>;

    fn name(&self) -> &'static str;
}

/// Success and redirect-class statuses both confirm a request
pub(crate) fn is_accepted(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

/// Joins `segments` onto `base`, percent-encoding each one as a single path
/// segment (titles may contain spaces or slashes)
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> ClientResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ClientError::InvalidInput(format!("invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidInput(format!("base URL cannot be a base: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Rejects non-accepted statuses, then decodes the JSON body
pub(crate) async fn decode_body<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> ClientResult<T> {
    let status = response.status();
    if !is_accepted(status) {
        return Err(ClientError::from_status(status, what));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(error = %e, what = %what, "Failed to decode response body");
        ClientError::from(e)
    })
}
