//! Error types for mmkb-node.
//!
//! `ExtractError` doubles as the user-facing diagnostic: its `Display` output is
//! the "Error ..." text shown next to successful extractions.

use crate::models::ContentType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Failure of a single extractor. Never escapes the dispatcher as an error;
/// it is rendered into the per-item result instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Error extracting text from {}: {cause}", .kind.label())]
    Failed { kind: ContentType, cause: String },

    #[error("Error transcribing audio: {0}")]
    Transcription(#[from] TranscribeError),

    #[error("Error extracting from remote source: {0}")]
    Remote(#[from] FetchError),
}

impl ExtractError {
    pub fn failed(kind: ContentType, cause: impl ToString) -> Self {
        Self::Failed {
            kind,
            cause: cause.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg/fallback conversion failed: {primary}; fallback: {fallback}")]
    Exhausted {
        primary: Box<TranscodeError>,
        fallback: Box<TranscodeError>,
    },
}

impl From<hound::Error> for TranscodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::Decode(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("could not read waveform: {0}")]
    Waveform(String),

    #[error("speech service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech service returned {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("speech recognition failed: {0}")]
    Recognition(String),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("could not prepare image: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("downloader produced no audio file (expected {})", .expected.display())]
    MissingArtifact { expected: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response contained no text")]
    EmptyResponse,
}
