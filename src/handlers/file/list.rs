use super::types::ListFilesResponse;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
pub struct ListFilesParams {
    path: Option<String>,
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<ListFilesResponse>, AppError> {
    let path = params.path.as_deref().unwrap_or("");
    let listing = state.files.list_dir(path).await?;

    if !listing.skipped.is_empty() {
        warn!(
            path,
            skipped = listing.skipped.len(),
            "listing skipped unreadable entries"
        );
    }

    Ok(Json(ListFilesResponse {
        current_path: if path.is_empty() {
            ".".to_string()
        } else {
            path.to_string()
        },
        files: listing.entries,
    }))
}
