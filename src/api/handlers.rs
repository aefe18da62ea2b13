use axum::{
    Json,
    body::to_bytes,
    extract::{Request, State},
    http::header,
};
use std::sync::Arc;
use std::time::Instant;

use crate::error::SearchError;
use crate::orchestrator::SearchOrchestrator;

use super::models::{HealthResponse, SearchResponse};

/// Largest search body read, and only once the caller is authenticated.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Authentication runs on the headers alone; the body is buffered afterwards,
/// so anonymous callers never make the server read a payload.
pub async fn search_handler(
    State(orchestrator): State<Arc<SearchOrchestrator>>,
    request: Request,
) -> Result<Json<SearchResponse>, SearchError> {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let header_str = |name: header::HeaderName| {
        parts.headers.get(name).and_then(|v| v.to_str().ok())
    };

    let result = async {
        let user = orchestrator
            .authenticate(header_str(header::AUTHORIZATION))
            .await?;

        let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
            tracing::debug!(error = %e, "unreadable search body");
            SearchError::QueryInvalid(format!(
                "request body unreadable or larger than {MAX_BODY_BYTES} bytes"
            ))
        })?;

        orchestrator
            .search(&user, &body, header_str(header::USER_AGENT))
            .await
    }
    .await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(response) => tracing::debug!(elapsed_ms, query = %response.query, "search completed"),
        Err(e) => tracing::debug!(elapsed_ms, error = %e, "search rejected"),
    }

    result.map(Json)
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
