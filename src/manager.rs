use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::data_models::AuthenticatedUser;
use crate::error::UpstreamError;

pub const SEARCH_ENDPOINT: &str = "/search";

#[derive(Debug, Serialize)]
struct ManagerSearchRequest<'a> {
    query: &'a str,
    user: &'a AuthenticatedUser,
}

/// Client for the upstream manager's search endpoint.
#[derive(Debug, Clone)]
pub struct ManagerClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl ManagerClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Forward a search and return the raw JSON body. Single attempt, bounded
    /// by the configured timeout.
    #[instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn search(
        &self,
        query: &str,
        user: &AuthenticatedUser,
    ) -> Result<Value, UpstreamError> {
        self.search_with_cancel(query, user, &CancellationToken::new())
            .await
    }

    /// Same as [`search`](Self::search), also aborted as soon as `cancel`
    /// fires. Whichever branch loses is dropped, which closes the in-flight
    /// connection; nothing outlives the returned future.
    pub async fn search_with_cancel(
        &self,
        query: &str,
        user: &AuthenticatedUser,
        cancel: &CancellationToken,
    ) -> Result<Value, UpstreamError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UpstreamError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => Err(UpstreamError::Timeout(self.timeout)),
            result = self.send(query, user) => result,
        }
    }

    async fn send(&self, query: &str, user: &AuthenticatedUser) -> Result<Value, UpstreamError> {
        let url = format!("{}{SEARCH_ENDPOINT}", self.base_url);
        debug!(url = %url, "forwarding search to manager");

        let response = self
            .http_client
            .post(&url)
            .json(&ManagerSearchRequest { query, user })
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "manager answered");
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::InvalidJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let user = user();
        let body = serde_json::to_value(ManagerSearchRequest {
            query: "tor",
            user: &user,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"query": "tor", "user": {"id": "u1", "email": "u1@example.com"}})
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        // Unroutable address; cancellation must win regardless.
        let client = ManagerClient::new(
            Client::new(),
            "http://10.255.255.1:9",
            Duration::from_millis(10),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = client.search_with_cancel("tor", &user(), &cancel).await;
        assert!(matches!(result, Err(UpstreamError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_without_cancellation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = ManagerClient::new(Client::new(), server.uri(), Duration::from_millis(50));
        let started = std::time::Instant::now();
        let result = client.search("tor", &user()).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(result, Err(UpstreamError::Timeout(t)) if t == Duration::from_millis(50)));
    }
}
