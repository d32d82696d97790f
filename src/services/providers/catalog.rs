//! Catalog service provider
//!
//! Resolves titles and identifiers against the per-category catalog
//! resources and serves the home page suggestion rows.
//!
//! API Flow:
//! 1. Title search: /v1/api/{tv|book}/title/{query} → `{content: item}`
//! 2. Detail lookup: /v1/api/{tv|book}/id/{id} → `{content: item}`
//! 3. Home feed: /v1/api/home/ → `{content: {books, shows}}`
use crate::{
    error::ClientResult,
    models::{CatalogItem, Category, Envelope, HomeFeed, ItemId},
    services::providers::{decode_body, endpoint, CatalogProvider},
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct HttpCatalogProvider {
    http_client: HttpClient,
    api_url: String,
}

impl HttpCatalogProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }

    async fn get_item(&self, segments: &[&str], what: &str) -> ClientResult<CatalogItem> {
        let url = endpoint(&self.api_url, segments)?;
        tracing::debug!(url = %url, "Catalog request");

        let response = self.http_client.get(url).send().await?;
        let envelope: Envelope<CatalogItem> = decode_body(response, what).await?;
        Ok(envelope.content)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn search_by_title(&self, category: Category, query: &str) -> ClientResult<CatalogItem> {
        let item = self
            .get_item(
                &["v1", "api", category.path_segment(), "title", query],
                query,
            )
            .await?;

        tracing::info!(
            query = %query,
            category = %category.path_segment(),
            provider = "catalog",
            "Title search completed"
        );

        Ok(item)
    }

    async fn fetch_by_id(&self, category: Category, id: &ItemId) -> ClientResult<CatalogItem> {
        self.get_item(
            &["v1", "api", category.path_segment(), "id", id.as_str()],
            id.as_str(),
        )
        .await
    }

    async fn home_feed(&self) -> ClientResult<HomeFeed> {
        let url = endpoint(&self.api_url, &["v1", "api", "home", ""])?;
        let response = self.http_client.get(url).send().await?;
        let envelope: Envelope<HomeFeed> = decode_body(response, "home").await?;

        tracing::info!(
            books = envelope.content.books.len(),
            shows = envelope.content.shows.len(),
            provider = "catalog",
            "Home feed fetched"
        );

        Ok(envelope.content)
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}
