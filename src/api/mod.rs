use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::error::SearchError;
use crate::orchestrator::SearchOrchestrator;

pub mod handlers;
pub mod models;

pub fn create_router(orchestrator: Arc<SearchOrchestrator>) -> Router {
    let static_dir = orchestrator.config().static_dir.clone();

    let routes = Router::new()
        .route("/search", post(handlers::search_handler))
        // Path used by the browser front end
        .route("/api/search", post(handlers::search_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(orchestrator)
        // Static file serving for the UI
        .fallback_service(ServeDir::new(static_dir));

    with_middleware(routes)
}

/// CORS, request tracing, and conversion of handler panics into the generic
/// `INTERNAL_ERROR` body.
pub fn with_middleware(routes: Router) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    SearchError::Internal(format!("handler panicked: {detail}")).into_response()
}
