use crate::handlers::{file, health};
use crate::middleware::logging;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/files", get(file::list_files))
        .route("/download", get(file::download));

    Router::new()
        .nest("/api", api_routes)
        // Everything that is not the API is a frontend asset.
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}
