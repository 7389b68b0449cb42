use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::ContentProvider;
use crate::services::MediaPipeline;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Audio and video files share one pipeline; only the diagnostic label differs.
pub struct MediaProvider {
    kind: ContentType,
    pipeline: Arc<MediaPipeline>,
}

impl MediaProvider {
    pub fn audio(pipeline: Arc<MediaPipeline>) -> Self {
        Self {
            kind: ContentType::Audio,
            pipeline,
        }
    }

    pub fn video(pipeline: Arc<MediaPipeline>) -> Self {
        Self {
            kind: ContentType::Video,
            pipeline,
        }
    }
}

#[async_trait]
impl ContentProvider for MediaProvider {
    fn content_type(&self) -> ContentType {
        self.kind
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        match self.pipeline.run(file_path).await {
            Ok(transcript) => Ok(transcript?),
            Err(err) => {
                warn!("No usable waveform for {}: {}", file_path.display(), err);
                Err(ExtractError::failed(self.kind, err))
            }
        }
    }
}
