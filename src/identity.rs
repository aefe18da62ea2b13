use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::data_models::AuthenticatedUser;
use crate::error::SearchError;

pub const USER_ENDPOINT: &str = "/auth/v1/user";

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Option<String>,
    email: Option<String>,
}

/// Verifies bearer tokens against the identity provider's user endpoint.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http_client: Client,
    timeout: Duration,
}

impl IdentityClient {
    pub fn new(http_client: Client, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }

    /// Resolve the user behind `token`. Transport failures and timeouts count
    /// as an invalid token; the provider is never retried.
    #[instrument(skip_all, fields(base_url = %base_url))]
    pub async fn verify(
        &self,
        base_url: &str,
        api_key: &str,
        token: &str,
    ) -> Result<AuthenticatedUser, SearchError> {
        let url = format!("{base_url}{USER_ENDPOINT}");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header("apikey", api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "identity provider unreachable");
                SearchError::AuthInvalid(format!("identity provider unreachable: {e}"))
            })?;

        let status = response.status();
        debug!(status = %status, "identity provider answered");
        if !status.is_success() {
            return Err(SearchError::AuthInvalid(format!(
                "identity provider returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: UserPayload = response.json().await.map_err(|e| {
            warn!(error = %e, "unreadable identity provider payload");
            SearchError::UserNotFound
        })?;

        match payload.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Ok(AuthenticatedUser {
                id,
                email: payload.email.unwrap_or_default(),
            }),
            None => Err(SearchError::UserNotFound),
        }
    }
}

/// Extract the token from a `Bearer <token>` Authorization header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, SearchError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(SearchError::AuthMissing)
}
