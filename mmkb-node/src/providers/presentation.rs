use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::{run_blocking, ContentProvider};
use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

static SLIDE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("slide pattern is valid"));

pub struct PresentationProvider;

impl PresentationProvider {
    pub fn new() -> Self {
        Self
    }

    /// Text of every shape on every slide, slides in deck order.
    pub(crate) fn shape_texts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> anyhow::Result<Vec<String>> {
        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let number = SLIDE_ENTRY.captures(name)?.get(1)?.as_str().parse().ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        slides.sort();

        let mut texts = Vec::new();
        for (_, name) in slides {
            let mut xml = String::new();
            archive
                .by_name(&name)?
                .read_to_string(&mut xml)
                .with_context(|| format!("reading {}", name))?;
            texts.extend(Self::slide_shapes(&xml)?);
        }
        Ok(texts)
    }

    /// Shapes carrying a text body; paragraphs and `<a:br/>` line breaks
    /// inside a shape become newlines, runs are concatenated.
    pub(crate) fn slide_shapes(xml: &str) -> anyhow::Result<Vec<String>> {
        let mut reader = Reader::from_str(xml);
        let mut shapes = Vec::new();
        let mut current: Option<String> = None;
        let mut paragraphs_in_shape = 0usize;
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"p:sp" => {
                        current = Some(String::new());
                        paragraphs_in_shape = 0;
                    }
                    b"a:p" => {
                        if let Some(shape) = current.as_mut() {
                            if paragraphs_in_shape > 0 {
                                shape.push('\n');
                            }
                            paragraphs_in_shape += 1;
                        }
                    }
                    b"a:t" => in_text = true,
                    b"a:br" => {
                        if let Some(shape) = current.as_mut() {
                            shape.push('\n');
                        }
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"a:p" => {
                        if let Some(shape) = current.as_mut() {
                            if paragraphs_in_shape > 0 {
                                shape.push('\n');
                            }
                            paragraphs_in_shape += 1;
                        }
                    }
                    b"a:br" => {
                        if let Some(shape) = current.as_mut() {
                            shape.push('\n');
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"a:t" => in_text = false,
                    b"p:sp" => {
                        if let Some(shape) = current.take() {
                            if !shape.trim().is_empty() {
                                shapes.push(shape);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    if let Some(shape) = current.as_mut() {
                        shape.push_str(&t.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(shapes)
    }
}

impl Default for PresentationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentProvider for PresentationProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Presentation
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        let path = file_path.to_owned();
        run_blocking(ContentType::Presentation, move || {
            let file = std::fs::File::open(&path)?;
            let mut archive = ZipArchive::new(file)?;
            Ok(PresentationProvider::shape_texts(&mut archive)?.join("\n"))
        })
        .await
    }
}
