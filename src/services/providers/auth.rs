//! Auth service provider
//!
//! Issues session tokens and records the user's like/dislike events. The
//! event endpoints authenticate with the access token in the JSON body.
use crate::{
    error::{ClientError, ClientResult},
    models::{
        AccessToken, Category, CredentialsResponse, Envelope, EventKind, EventPullRequest,
        EventPullResponse, EventPushRequest, ItemId, LoginRequest, RegisterRequest,
    },
    services::providers::{decode_body, endpoint, is_accepted, AuthProvider},
};
use reqwest::Client as HttpClient;
use serde::Serialize;

#[derive(Clone)]
pub struct HttpAuthProvider {
    http_client: HttpClient,
    api_url: String,
}

impl HttpAuthProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }

    /// Login and register share one response shape; a refusal carries the
    /// server's message when it sent one
    async fn credentials<B: Serialize + Sync>(
        &self,
        action: &str,
        body: &B,
    ) -> ClientResult<CredentialsResponse> {
        let url = endpoint(&self.api_url, &["v1", "auth", action])?;
        let response = self.http_client.post(url).json(body).send().await?;

        let status = response.status();
        if is_accepted(status) {
            return decode_body(response, action).await;
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<CredentialsResponse>(&body)
            .map(|r| r.message_text())
            .unwrap_or_default();

        tracing::warn!(
            action = %action,
            status = status.as_u16(),
            message = %message,
            "Auth service refused credentials"
        );

        Err(ClientError::Rejected(message))
    }
}

#[async_trait::async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn login(&self, request: &LoginRequest) -> ClientResult<CredentialsResponse> {
        self.credentials("login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<CredentialsResponse> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(ClientError::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }
        self.credentials("register", request).await
    }

    async fn pull_liked(
        &self,
        token: &AccessToken,
        category: Category,
    ) -> ClientResult<Vec<ItemId>> {
        let url = endpoint(&self.api_url, &["v1", "auth", "event", "pull"])?;
        let response = self
            .http_client
            .post(url)
            .json(&EventPullRequest::likes(token.as_str(), category))
            .send()
            .await?;

        let envelope: Envelope<EventPullResponse> = decode_body(response, "event pull").await?;

        // Keep the first occurrence of every id, in server order
        let mut ids: Vec<ItemId> = Vec::with_capacity(envelope.content.items.len());
        for event in envelope.content.items {
            if !ids.contains(&event.id) {
                ids.push(event.id);
            }
        }

        tracing::debug!(
            category = %category.event_type(),
            liked = ids.len(),
            provider = "auth",
            "Liked identifiers pulled"
        );

        Ok(ids)
    }

    async fn push_event(
        &self,
        token: &AccessToken,
        event: EventKind,
        category: Category,
        id: &ItemId,
    ) -> ClientResult<()> {
        let url = endpoint(&self.api_url, &["v1", "auth", "event", "push"])?;
        let response = self
            .http_client
            .post(url)
            .json(&EventPushRequest::new(token.as_str(), event, category, id))
            .send()
            .await?;

        let status = response.status();
        if !is_accepted(status) {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                event = %event.as_str(),
                id = %id,
                "Event push refused"
            );
            return Err(ClientError::Status(status.as_u16()));
        }

        tracing::info!(
            event = %event.as_str(),
            category = %category.event_type(),
            id = %id,
            provider = "auth",
            "Event pushed"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "auth"
    }
}
