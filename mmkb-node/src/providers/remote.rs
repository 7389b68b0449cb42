use crate::error::ExtractError;
use crate::services::{MediaFetcher, MediaPipeline};
use std::sync::Arc;
use tracing::info;

/// Remote media links: download the best audio stream as a canonical waveform,
/// then transcribe it. The downloaded artifact is already mono 16 kHz, so no
/// transcoding pass is run.
pub struct RemoteProvider {
    fetcher: Arc<dyn MediaFetcher>,
    pipeline: Arc<MediaPipeline>,
}

impl RemoteProvider {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, pipeline: Arc<MediaPipeline>) -> Self {
        Self { fetcher, pipeline }
    }

    pub async fn extract_text(&self, url: &str) -> Result<String, ExtractError> {
        let audio = self.fetcher.fetch(url).await?;
        info!("Fetched {} to {}", url, audio.path.display());
        let transcript = self.pipeline.transcribe(&audio.path).await?;
        Ok(transcript)
    }
}
