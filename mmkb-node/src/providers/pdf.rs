use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::{run_blocking, ContentProvider};
use async_trait::async_trait;
use pdf_extract::extract_text;
use std::path::Path;

pub struct PdfProvider;

impl PdfProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Page text arrives separated by form feeds; keep one page per block and drop
/// pages with nothing on them.
pub(crate) fn join_pages(raw: &str) -> String {
    raw.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ContentProvider for PdfProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Pdf
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        let path = file_path.to_owned();
        run_blocking(ContentType::Pdf, move || {
            let raw = extract_text(&path)?;
            Ok(join_pages(&raw))
        })
        .await
    }
}
