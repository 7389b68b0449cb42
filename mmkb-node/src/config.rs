//! Node configuration.
//!
//! Values come from an optional TOML file (`MMKB_CONFIG`) and are then
//! overridden by environment variables. Components receive the pieces they
//! need at construction time.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub work_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub tools: ToolsConfig,
    pub speech: SpeechConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub ingest: IngestConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("knowledge_base.db"),
            work_dir: env::temp_dir(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            tools: ToolsConfig::default(),
            speech: SpeechConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub tesseract: PathBuf,
    pub yt_dlp: PathBuf,
    pub ocr_language: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            tesseract: PathBuf::from("tesseract"),
            yt_dlp: PathBuf::from("yt-dlp"),
            ocr_language: None,
        }
    }
}

/// OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub language: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
            language: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub limit: usize,
    pub max_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            max_chars: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Persist "Error ..." diagnostics as document text, like successful extractions.
    pub store_failed_extractions: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            store_failed_extractions: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("MMKB_CONFIG") {
            Ok(path) => Self::load_from(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("MMKB_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("MMKB_WORK_DIR") {
            self.work_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = env::var("MMKB_BIND_ADDR") {
            self.bind_addr = addr.parse().map_err(|_| ConfigError::Invalid {
                key: "MMKB_BIND_ADDR",
                value: addr.clone(),
            })?;
        }
        if let Ok(path) = env::var("FFMPEG_PATH") {
            self.tools.ffmpeg = PathBuf::from(path);
        }
        if let Ok(path) = env::var("TESSERACT_PATH") {
            self.tools.tesseract = PathBuf::from(path);
        }
        if let Ok(path) = env::var("YT_DLP_PATH") {
            self.tools.yt_dlp = PathBuf::from(path);
        }
        if let Some(key) = first_env(&["SPEECH_API_KEY", "OPENAI_API_KEY"]) {
            self.speech.api_key = Some(key);
        }
        if let Some(key) = first_env(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]) {
            self.generation.api_key = Some(key);
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.generation.model = model;
        }
        Ok(())
    }
}

impl SpeechConfig {
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(self.api_key.as_deref()).ok_or(ConfigError::Missing("speech.api_key"))
    }
}

impl GenerationConfig {
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(self.api_key.as_deref()).ok_or(ConfigError::Missing("generation.api_key"))
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
