use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::ContentProvider;
use async_trait::async_trait;
use std::path::Path;

/// UTF-8 plain text, returned as stored.
pub struct TextProvider;

impl TextProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentProvider for TextProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        tokio::fs::read_to_string(file_path)
            .await
            .map_err(|e| ExtractError::failed(ContentType::Text, e))
    }
}
