use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;


#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Pdf,
    Document,
    Presentation,
    Text,
    Markdown,
    Image,
    Audio,
    Video,
    Remote,
}

/// Outcome of classifying a path or URL. Unsupported inputs are carried as a
/// value so the dispatcher can answer with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Supported(ContentType),
    Unsupported { extension: String },
}

impl ContentType {
    pub fn classify(path_or_url: &str) -> Format {
        if is_remote(path_or_url) {
            return Format::Supported(ContentType::Remote);
        }

        let extension = Path::new(path_or_url)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match Self::from_extension(&extension) {
            Some(content_type) => Format::Supported(content_type),
            None if extension.is_empty() => Format::Unsupported {
                extension: String::new(),
            },
            None => Format::Unsupported {
                extension: format!(".{}", extension),
            },
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let content_type = match extension.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => ContentType::Pdf,
            "docx" => ContentType::Document,
            "pptx" => ContentType::Presentation,
            "txt" => ContentType::Text,
            "md" => ContentType::Markdown,
            "png" | "jpg" | "jpeg" | "bmp" | "tiff" => ContentType::Image,
            "mp3" | "wav" | "m4a" | "ogg" => ContentType::Audio,
            "mp4" | "mov" | "mkv" | "avi" => ContentType::Video,
            _ => return None,
        };
        Some(content_type)
    }

    /// Name used in "Error extracting text from <label>" diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Pdf => "PDF",
            ContentType::Document => "Word document",
            ContentType::Presentation => "PPTX",
            ContentType::Text => "text file",
            ContentType::Markdown => "Markdown file",
            ContentType::Image => "image",
            ContentType::Audio => "audio",
            ContentType::Video => "video",
            ContentType::Remote => "remote source",
        }
    }

    pub fn no_content_sentinel(&self) -> &'static str {
        match self {
            ContentType::Pdf => "[No readable text found in PDF]",
            ContentType::Document => "[No text found in Word file]",
            ContentType::Presentation => "[No text found in PPTX]",
            ContentType::Text => "[No text found in text file]",
            ContentType::Markdown => "[No text found in Markdown file]",
            ContentType::Image => "[No readable text detected in image]",
            ContentType::Audio => "[No speech recognized in audio]",
            ContentType::Video => "[No speech recognized in video]",
            ContentType::Remote => "[No speech recognized in remote media]",
        }
    }
}

pub fn is_remote(path_or_url: &str) -> bool {
    path_or_url
        .get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
}

/// Typed result of one dispatcher call. `Display` renders the text shown to
/// the user: the extracted text, a sentinel, or an "Error ..." diagnostic.
#[derive(Debug)]
pub enum Extraction {
    Text {
        content_type: ContentType,
        text: String,
    },
    Empty(ContentType),
    Failed(ExtractError),
    Unsupported {
        extension: String,
    },
}

impl Extraction {
    pub fn from_result(content_type: ContentType, result: Result<String, ExtractError>) -> Self {
        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Extraction::Empty(content_type)
                } else {
                    Extraction::Text {
                        content_type,
                        text: text.to_string(),
                    }
                }
            }
            Err(err) => Extraction::Failed(err),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Extraction::Failed(_) | Extraction::Unsupported { .. })
    }

    pub fn status(&self) -> ItemStatus {
        match self {
            Extraction::Text { .. } => ItemStatus::Extracted,
            Extraction::Empty(_) => ItemStatus::Empty,
            Extraction::Failed(_) => ItemStatus::Failed,
            Extraction::Unsupported { .. } => ItemStatus::Unsupported,
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Text { text, .. } => f.write_str(text),
            Extraction::Empty(content_type) => f.write_str(content_type.no_content_sentinel()),
            Extraction::Failed(err) => write!(f, "{}", err),
            Extraction::Unsupported { extension } => {
                write!(f, "Unsupported file type: {}", extension)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    pub name: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Extracted,
    Empty,
    Failed,
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub name: String,
    pub status: ItemStatus,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestItem {
    pub name: String,
    pub status: ItemStatus,
    pub stored: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub items: Vec<IngestItem>,
}

impl IngestReport {
    pub fn added(&self) -> impl Iterator<Item = &IngestItem> {
        self.items.iter().filter(|item| item.stored)
    }

    pub fn failed(&self) -> impl Iterator<Item = &IngestItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Failed | ItemStatus::Unsupported))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesRequest {
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub query: String,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: String,
}
