use crate::api::{AppError, AppState};
use crate::models::{ContextRequest, ContextResponse, QueryRequest, QueryResponse};
use axum::{extract::State, routing::post, Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(answer_query))
        .route("/context", post(build_context))
}

async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("Please enter a question"));
    }

    let answer = state.query.answer(query).await;
    Ok(Json(QueryResponse { answer }))
}

async fn build_context(
    State(state): State<AppState>,
    Json(request): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    let builder = state.query.context_builder().clone();
    let context = tokio::task::spawn_blocking(move || match request.max_chars {
        Some(max_chars) => builder.build_context_with(&request.query, max_chars),
        None => builder.build_context(&request.query),
    })
    .await?;

    Ok(Json(ContextResponse { context }))
}
