use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::{run_blocking, ContentProvider};
use async_trait::async_trait;
use docx_rs::{read_docx, DocumentChild, Docx, ParagraphChild, RunChild};
use std::path::Path;

pub struct DocumentProvider;

impl DocumentProvider {
    pub fn new() -> Self {
        Self
    }

    /// Body paragraphs in document order, one per line. Tables are skipped.
    pub(crate) fn paragraphs(docx: &Docx) -> Vec<String> {
        let mut paragraphs = Vec::new();

        for child in &docx.document.children {
            if let DocumentChild::Paragraph(p) = child {
                let mut para_text = String::new();
                Self::push_runs(&p.children, &mut para_text);
                if !para_text.trim().is_empty() {
                    paragraphs.push(para_text);
                }
            }
        }

        paragraphs
    }

    /// Run text, descending into hyperlinks.
    fn push_runs(children: &[ParagraphChild], out: &mut String) {
        for child in children {
            match child {
                ParagraphChild::Run(r) => {
                    for text_child in &r.children {
                        if let RunChild::Text(t) = text_child {
                            out.push_str(&t.text);
                        }
                    }
                }
                ParagraphChild::Hyperlink(link) => Self::push_runs(&link.children, out),
                _ => {}
            }
        }
    }
}

impl Default for DocumentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentProvider for DocumentProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Document
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        let file_bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| ExtractError::failed(ContentType::Document, e))?;

        run_blocking(ContentType::Document, move || {
            let docx = read_docx(&file_bytes)?;
            Ok(DocumentProvider::paragraphs(&docx).join("\n"))
        })
        .await
    }
}
