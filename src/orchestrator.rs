use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::models::{ResultSource, SearchMetadata, SearchRequest, SearchResponse};
use crate::config::Config;
use crate::data_models::{AuthenticatedUser, SearchLog};
use crate::db::SearchLogRepo;
use crate::error::SearchError;
use crate::fallback::fallback_results;
use crate::identity::{IdentityClient, bearer_token};
use crate::manager::ManagerClient;
use crate::normalize::normalize;

/// Authenticates a caller, forwards the query to the manager and falls back
/// to canned results when the manager cannot answer.
pub struct SearchOrchestrator {
    config: Arc<Config>,
    identity: IdentityClient,
    manager: ManagerClient,
    search_logs: Option<SearchLogRepo>,
}

impl SearchOrchestrator {
    pub fn new(config: Arc<Config>, search_logs: Option<SearchLogRepo>) -> Self {
        let http_client = Client::new();
        Self {
            identity: IdentityClient::new(http_client.clone(), config.identity_timeout),
            manager: ManagerClient::new(
                http_client,
                config.manager_url.clone(),
                config.manager_timeout,
            ),
            config,
            search_logs,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the caller from the `Authorization` header value. Runs before
    /// the request body is read.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedUser, SearchError> {
        let token = bearer_token(authorization)?;

        let (identity_url, identity_key) = self
            .config
            .identity()
            .map_err(|missing| SearchError::ServerMisconfigured(missing.to_string()))?;

        let user = self.identity.verify(identity_url, identity_key, token).await?;
        debug!(user_id = %user.id, "caller authenticated");
        Ok(user)
    }

    /// Answer an authenticated caller's search from the raw request body.
    pub async fn search(
        &self,
        user: &AuthenticatedUser,
        body: &[u8],
        user_agent: Option<&str>,
    ) -> Result<SearchResponse, SearchError> {
        let query = parse_query(body)?;

        let response = self.query_manager(query, user).await;
        info!(
            user_id = %response.user_id,
            search_id = %response.metadata.search_id,
            source = response.metadata.source.as_str(),
            results = response.metadata.results_count,
            "search answered"
        );

        self.record(&response, user_agent);
        Ok(response)
    }

    /// Ask the manager, degrading to fallback results on any failure.
    async fn query_manager(&self, query: String, user: &AuthenticatedUser) -> SearchResponse {
        let (results, source, manager_error) = match self.manager.search(&query, user).await {
            Ok(body) => (normalize(body), ResultSource::ManagerService, None),
            Err(e) => {
                warn!(error = %e, "manager unavailable, serving fallback results");
                (
                    fallback_results(&query),
                    ResultSource::Fallback,
                    Some(e.to_string()),
                )
            }
        };

        build_response(query, user.id.clone(), results, source, manager_error)
    }

    fn record(&self, response: &SearchResponse, user_agent: Option<&str>) {
        let Some(repo) = self.search_logs.clone() else {
            return;
        };
        let entry = SearchLog::new(
            response.user_id.clone(),
            response.query.clone(),
            response.metadata.results_count,
            user_agent.unwrap_or("server").to_string(),
            response.metadata.source.as_str().to_string(),
            response.metadata.search_id.to_string(),
        );
        tokio::spawn(async move {
            match repo.insert(&entry).await {
                Ok(id) => debug!(id = %id, "search logged"),
                Err(e) => warn!(error = ?e, "failed to log search"),
            }
        });
    }
}

/// Pull a non-empty, trimmed `query` string out of a JSON request body.
pub fn parse_query(body: &[u8]) -> Result<String, SearchError> {
    // Only an object is accepted; serde would also read `["tor"]` as a struct.
    let body: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|_| SearchError::QueryInvalid("request body must be a JSON object".into()))?;

    let request: SearchRequest = serde_json::from_value(Value::Object(body))
        .map_err(|_| SearchError::QueryInvalid("query must be a string".into()))?;

    let query = request.query.trim();
    if query.is_empty() {
        return Err(SearchError::QueryInvalid("query cannot be empty".into()));
    }
    Ok(query.to_string())
}

pub fn build_response(
    query: String,
    user_id: String,
    results: Vec<Value>,
    source: ResultSource,
    manager_error: Option<String>,
) -> SearchResponse {
    SearchResponse {
        success: true,
        query,
        user_id,
        metadata: SearchMetadata {
            search_id: Uuid::new_v4(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            results_count: results.len(),
            source,
            manager_error,
        },
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_trims() {
        let query = parse_query(br#"{"query": "  onion routing  "}"#).unwrap();
        assert_eq!(query, "onion routing");
    }

    #[test]
    fn test_parse_query_rejects_invalid_bodies() {
        let bodies: [&[u8]; 8] = [
            br#"{"query": ""}"#,
            br#"{"query": "   "}"#,
            br#"{"query": 42}"#,
            br#"{"query": null}"#,
            br#"{"q": "tor"}"#,
            br#"["tor"]"#,
            b"not json",
            b"",
        ];
        for body in bodies {
            assert!(
                matches!(parse_query(body), Err(SearchError::QueryInvalid(_))),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_build_response_counts_results() {
        let response = build_response(
            "tor".to_string(),
            "u1".to_string(),
            vec![json!({"title": "a"}), json!({"title": "b"})],
            ResultSource::ManagerService,
            None,
        );
        assert!(response.success);
        assert_eq!(response.metadata.results_count, response.results.len());
        assert!(response.metadata.timestamp.ends_with('Z'));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["metadata"]["source"], "manager-service");
        assert!(body["metadata"].get("manager_error").is_none());
    }
}
