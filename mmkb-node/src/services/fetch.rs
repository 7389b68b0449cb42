use crate::error::FetchError;
use crate::services::transcode::{tail, TARGET_SAMPLE_RATE};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

pub const ARTIFACT_STEM: &str = "remote_audio";

static ARTIFACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^remote_audio.*\.wav$").expect("artifact pattern is valid"));

/// Downloaded waveform together with the scoped directory holding it.
#[derive(Debug)]
pub struct FetchedAudio {
    pub path: PathBuf,
    _dir: TempDir,
}

impl FetchedAudio {
    pub fn new(path: PathBuf, dir: TempDir) -> Self {
        Self { path, _dir: dir }
    }
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedAudio, FetchError>;
}

pub struct YtDlpFetcher {
    binary: PathBuf,
    work_dir: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAudio, FetchError> {
        let dir = tempfile::Builder::new()
            .prefix("mmkb-remote-")
            .tempdir_in(&self.work_dir)?;
        let template = dir.path().join(format!("{}.%(ext)s", ARTIFACT_STEM));

        info!("Downloading best audio stream from {}", url);
        let tool = self.binary.display().to_string();
        let output = Command::new(&self.binary)
            .args(["--format", "bestaudio/best"])
            .args(["--extract-audio", "--audio-format", "wav", "--audio-quality", "192K"])
            .arg("--postprocessor-args")
            .arg(format!("ffmpeg:-ac 1 -ar {} -acodec pcm_s16le", TARGET_SAMPLE_RATE))
            .args(["--no-playlist", "--quiet", "--no-warnings", "--output"])
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Exit {
                tool,
                status: output.status,
                stderr: tail(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        let path = locate_artifact(dir.path())?;
        Ok(FetchedAudio::new(path, dir))
    }
}

/// Finds the post-processed waveform: the expected name first, then any file
/// matching the artifact pattern.
pub fn locate_artifact(dir: &Path) -> Result<PathBuf, FetchError> {
    let expected = dir.join(format!("{}.wav", ARTIFACT_STEM));
    if expected.exists() {
        return Ok(expected);
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| ARTIFACT_PATTERN.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    candidates.sort();

    match candidates.into_iter().next() {
        Some(found) => {
            debug!("Expected {} missing, using {}", expected.display(), found.display());
            Ok(found)
        }
        None => Err(FetchError::MissingArtifact { expected }),
    }
}
