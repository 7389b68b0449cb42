pub mod answer;
pub mod fetch;
pub mod generation;
pub mod media;
pub mod ocr;
pub mod speech;
pub mod transcode;


pub use answer::QueryEngine;
pub use fetch::{MediaFetcher, YtDlpFetcher};
pub use generation::{GeminiClient, GenerationService};
pub use media::MediaPipeline;
pub use ocr::{OcrEngine, TesseractCli};
pub use speech::{SpeechRecognizer, WhisperApiRecognizer};
pub use transcode::{FfmpegTranscoder, Transcoder, WavResampler};

use crate::config::AppConfig;
use crate::error::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;

/// External collaborators the extractors depend on.
#[derive(Clone)]
pub struct ExtractionServices {
    pub ocr: Arc<dyn OcrEngine>,
    pub transcoder: Arc<dyn Transcoder>,
    pub fallback_transcoder: Arc<dyn Transcoder>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub work_dir: PathBuf,
}

impl ExtractionServices {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let work_dir = config.work_dir.clone();
        Ok(Self {
            ocr: Arc::new(TesseractCli::new(
                &config.tools.tesseract,
                config.tools.ocr_language.clone(),
                &work_dir,
            )),
            transcoder: Arc::new(FfmpegTranscoder::new(&config.tools.ffmpeg)),
            fallback_transcoder: Arc::new(WavResampler::new()),
            recognizer: Arc::new(WhisperApiRecognizer::from_config(&config.speech)?),
            fetcher: Arc::new(YtDlpFetcher::new(&config.tools.yt_dlp, &work_dir)),
            work_dir,
        })
    }

    pub fn media_pipeline(&self) -> MediaPipeline {
        MediaPipeline::new(
            self.transcoder.clone(),
            self.fallback_transcoder.clone(),
            self.recognizer.clone(),
            self.work_dir.clone(),
        )
    }
}
