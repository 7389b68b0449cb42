use crate::error::OcrError;
use crate::services::transcode::tail;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Page segmentation mode for a single uniform block of text.
pub const SINGLE_BLOCK_PSM: &str = "6";

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError>;
}

pub struct TesseractCli {
    binary: PathBuf,
    language: Option<String>,
    work_dir: PathBuf,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>, language: Option<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            language,
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("mmkb-ocr-")
            .suffix(".png")
            .tempfile_in(&self.work_dir)?
            .into_temp_path();

        let png_path = input.to_path_buf();
        tokio::task::spawn_blocking(move || image.save_with_format(&png_path, ImageFormat::Png))
            .await
            .map_err(|e| OcrError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        let tool = self.binary.display().to_string();
        let mut command = Command::new(&self.binary);
        command
            .arg(&*input)
            .arg("stdout")
            .args(["--psm", SINGLE_BLOCK_PSM]);
        if let Some(language) = &self.language {
            command.args(["-l", language.as_str()]);
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| OcrError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Exit {
                tool,
                status: output.status,
                stderr: tail(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
