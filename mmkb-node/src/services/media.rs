//! Two-stage media pipeline: transcode to a canonical waveform, then
//! transcribe it.

use crate::error::{TranscodeError, TranscribeError};
use crate::services::speech::SpeechRecognizer;
use crate::services::transcode::{Transcoder, WaveformArtifact, TARGET_SAMPLE_RATE};
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct MediaPipeline {
    primary: Arc<dyn Transcoder>,
    fallback: Arc<dyn Transcoder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    work_dir: PathBuf,
}

impl MediaPipeline {
    pub fn new(
        primary: Arc<dyn Transcoder>,
        fallback: Arc<dyn Transcoder>,
        recognizer: Arc<dyn SpeechRecognizer>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary,
            fallback,
            recognizer,
            work_dir: work_dir.into(),
        }
    }

    /// Converts `input` into a fresh waveform artifact, trying the primary
    /// transcoder first and the fallback decoder second.
    pub async fn transcode(&self, input: &Path) -> Result<WaveformArtifact, TranscodeError> {
        let artifact = WaveformArtifact::create_in(&self.work_dir)?;

        let primary_err = match self.primary.transcode(input, artifact.path()).await {
            Ok(()) => return Ok(artifact),
            Err(err) => err,
        };

        warn!(
            "{} could not convert {}: {}; trying {}",
            self.primary.name(),
            input.display(),
            primary_err,
            self.fallback.name()
        );

        match self.fallback.transcode(input, artifact.path()).await {
            Ok(()) => Ok(artifact),
            Err(fallback_err) => Err(TranscodeError::Exhausted {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            }),
        }
    }

    /// Reads a waveform and submits it to the speech recognizer.
    pub async fn transcribe(&self, wav_path: &Path) -> Result<String, TranscribeError> {
        let path = wav_path.to_owned();
        let duration_secs = tokio::task::spawn_blocking(move || waveform_duration(&path))
            .await
            .map_err(|e| TranscribeError::Waveform(e.to_string()))??;

        let bytes = tokio::fs::read(wav_path)
            .await
            .map_err(|e| TranscribeError::Waveform(e.to_string()))?;

        info!(
            "Transcribing {} ({:.1}s of audio)",
            wav_path.display(),
            duration_secs
        );
        let text = self.recognizer.recognize(bytes).await?;
        debug!("Recognized {} characters", text.len());
        Ok(text)
    }

    /// Transcode then transcribe. The artifact is released before returning.
    pub async fn run(&self, input: &Path) -> Result<Result<String, TranscribeError>, TranscodeError> {
        let artifact = self.transcode(input).await?;
        let transcript = self.transcribe(artifact.path()).await;
        drop(artifact);
        Ok(transcript)
    }
}

fn waveform_duration(path: &Path) -> Result<f32, TranscribeError> {
    let reader = WavReader::open(path).map_err(|e| TranscribeError::Waveform(e.to_string()))?;
    let spec = reader.spec();
    if spec.sample_rate != TARGET_SAMPLE_RATE || spec.channels != 1 {
        debug!(
            "{} is {} Hz / {} channel(s), not the canonical layout",
            path.display(),
            spec.sample_rate,
            spec.channels
        );
    }
    Ok(reader.duration() as f32 / spec.sample_rate.max(1) as f32)
}
