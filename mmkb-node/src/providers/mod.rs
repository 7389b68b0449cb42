pub mod audio;
pub mod dispatch;
pub mod document;
pub mod image_ocr;
pub mod markdown;
pub mod pdf;
pub mod presentation;
pub mod registry;
pub mod remote;
pub mod text;


pub use dispatch::Extractor;
pub use registry::ProviderRegistry;

use crate::error::ExtractError;
use crate::models::ContentType;
use async_trait::async_trait;
use std::path::Path;

/// Converts one local file into raw text. Implementations report failures as
/// `ExtractError`; trimming and the empty-result sentinel are applied by the
/// dispatcher.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    fn content_type(&self) -> ContentType;

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError>;
}

/// Runs a blocking parser off the async runtime. A panicking parser is
/// reported like any other extraction failure.
pub(crate) async fn run_blocking<F>(kind: ContentType, job: F) -> Result<String, ExtractError>
where
    F: FnOnce() -> anyhow::Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ExtractError::failed(kind, format!("parser task aborted: {}", e)))?
        .map_err(|e| ExtractError::failed(kind, e))
}
