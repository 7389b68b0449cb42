pub mod content;
pub mod query;

use crate::config::IngestConfig;
use crate::providers::Extractor;
use crate::services::QueryEngine;
use crate::store::KnowledgeStore;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Shared handles for every route.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub store: KnowledgeStore,
    pub query: Arc<QueryEngine>,
    pub ingest: IngestConfig,
    pub work_dir: PathBuf,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/content", content::routes())
        .nest("/query", query::routes())
        .with_state(state)
}

pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {:#}", self.error);
            (self.status, format!("Internal error: {}", self.error)).into_response()
        } else {
            (self.status, self.error.to_string()).into_response()
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}
