//! Recommendation service provider
//!
//! Thin client over the ML service: ranking happens there, this side only
//! sends the liked items and relays the scored ids.
use crate::{
    error::{ClientError, ClientResult},
    models::{FeedbackRequest, HealthStatus, RecommendRequest, RecommendResponse},
    services::providers::{decode_body, endpoint, is_accepted, RecommendationProvider},
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct HttpRecommendationProvider {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommendationProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for HttpRecommendationProvider {
    async fn recommend(&self, request: &RecommendRequest) -> ClientResult<RecommendResponse> {
        if request.limit == 0 {
            return Ok(RecommendResponse::default());
        }

        let url = endpoint(&self.api_url, &["ml", "recommend"])?;
        let response = self.http_client.post(url).json(request).send().await?;
        let recommendations: RecommendResponse = decode_body(response, "recommend").await?;

        tracing::info!(
            liked = request.liked_items.len(),
            returned = recommendations.items.len(),
            provider = "recommender",
            "Recommendations fetched"
        );

        Ok(recommendations)
    }

    async fn feedback(&self, request: &FeedbackRequest) -> ClientResult<()> {
        let url = endpoint(&self.api_url, &["ml", "feedback"])?;
        let response = self.http_client.post(url).json(request).send().await?;

        if !is_accepted(response.status()) {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        let url = endpoint(&self.api_url, &["ml", "health"])?;
        let response = self.http_client.get(url).send().await?;
        decode_body(response, "health").await
    }

    fn name(&self) -> &'static str {
        "recommender"
    }
}
