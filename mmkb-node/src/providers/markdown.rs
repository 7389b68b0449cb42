use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::ContentProvider;
use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, TagEnd};
use std::path::Path;

pub struct MarkdownProvider;

impl MarkdownProvider {
    pub fn new() -> Self {
        Self
    }

    /// Strips markup, keeping headings, paragraphs, list items and code one
    /// block per line.
    pub(crate) fn flatten(markdown: &str) -> String {
        let mut text = String::new();
        let mut in_code_block = false;

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) => text.push_str(&t),
                Event::Code(code) => text.push_str(&code),
                Event::Start(pulldown_cmark::Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    text.push('\n');
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    text.push('\n');
                }
                Event::End(
                    TagEnd::Heading(_)
                    | TagEnd::Paragraph
                    | TagEnd::Item
                    | TagEnd::TableCell
                    | TagEnd::TableRow,
                ) => text.push('\n'),
                Event::SoftBreak => {
                    if in_code_block {
                        text.push('\n');
                    } else {
                        text.push(' ');
                    }
                }
                Event::HardBreak => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MarkdownProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentProvider for MarkdownProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Markdown
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        let content = tokio::fs::read_to_string(file_path)
            .await
            .map_err(|e| ExtractError::failed(ContentType::Markdown, e))?;
        Ok(Self::flatten(&content))
    }
}
