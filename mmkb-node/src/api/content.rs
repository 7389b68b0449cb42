use crate::api::{AppError, AppState};
use crate::models::{ExtractionResponse, IngestItem, IngestReport, SourcesRequest};
use axum::{
    extract::{multipart::Field, Multipart, State},
    routing::post,
    Json, Router,
};
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/extract", post(extract_upload))
        .route("/ingest", post(ingest_uploads))
        .route("/ingest/sources", post(ingest_sources))
}

/// Upload held in a scoped temp file that keeps the original extension, so
/// format detection sees the same name the user uploaded.
struct StagedUpload {
    name: String,
    path: TempPath,
}

async fn stage_upload(state: &AppState, field: Field<'_>) -> Result<StagedUpload, AppError> {
    let name = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request("file field has no filename"))?;

    let suffix = Path::new(&name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let path = tempfile::Builder::new()
        .prefix("mmkb-upload-")
        .suffix(&suffix)
        .tempfile_in(&state.work_dir)?
        .into_temp_path();

    let bytes = field.bytes().await?;
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    Ok(StagedUpload { name, path })
}

async fn extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let upload = stage_upload(&state, field).await?;
            let extraction = state.extractor.extract(&upload.path.to_string_lossy()).await;

            return Ok(Json(ExtractionResponse {
                name: upload.name,
                status: extraction.status(),
                text: extraction.to_string(),
            }));
        }
    }

    Err(AppError::bad_request("No file provided"))
}

async fn ingest_uploads(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>, AppError> {
    let mut uploads = Vec::new();
    let mut url = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => uploads.push(stage_upload(&state, field).await?),
            Some("url") => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    url = Some(value.trim().to_string());
                }
            }
            _ => {}
        }
    }

    if uploads.is_empty() && url.is_none() {
        return Err(AppError::bad_request("No file or url provided"));
    }

    let mut report = IngestReport::default();
    for upload in &uploads {
        let source = upload.path.to_string_lossy();
        report
            .items
            .push(ingest_one(&state, &upload.name, &source, &upload.name).await?);
    }
    if let Some(url) = url {
        report.items.push(ingest_one(&state, &url, &url, &url).await?);
    }

    log_report(&report);
    Ok(Json(report))
}

async fn ingest_sources(
    State(state): State<AppState>,
    Json(request): Json<SourcesRequest>,
) -> Result<Json<IngestReport>, AppError> {
    if request.sources.iter().all(|source| source.trim().is_empty()) {
        return Err(AppError::bad_request("No sources provided"));
    }

    let mut report = IngestReport::default();
    for source in request.sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        report.items.push(ingest_one(&state, source, source, source).await?);
    }

    log_report(&report);
    Ok(Json(report))
}

/// Extracts `input` and stores the result under `name`, recording `origin` as
/// its source. Extraction problems are part of the item; only a store failure
/// aborts the request.
async fn ingest_one(state: &AppState, name: &str, input: &str, origin: &str) -> Result<IngestItem, AppError> {
    let extraction = state.extractor.extract(input).await;
    let status = extraction.status();
    let text = extraction.to_string();
    let store_it = extraction.is_success() || state.ingest.store_failed_extractions;

    if store_it {
        let store = state.store.clone();
        let (name, origin, body) = (name.to_string(), origin.to_string(), text.clone());
        tokio::task::spawn_blocking(move || store.add_with_source(&name, &origin, &body)).await??;
    } else {
        warn!("Not storing {}: {}", name, text);
    }

    Ok(IngestItem {
        name: name.to_string(),
        status,
        stored: store_it,
        text,
    })
}

fn log_report(report: &IngestReport) {
    info!(
        "Ingested {} item(s): {} stored, {} failed",
        report.items.len(),
        report.added().count(),
        report.failed().count()
    );
}
