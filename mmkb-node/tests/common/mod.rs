#![allow(dead_code)]

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use mmkb_node::error::{FetchError, GenerationError, OcrError, TranscribeError};
use mmkb_node::services::fetch::{locate_artifact, FetchedAudio};
use mmkb_node::services::{
    ExtractionServices, FfmpegTranscoder, GenerationService, MediaFetcher, OcrEngine, SpeechRecognizer,
    WavResampler,
};
use std::path::Path;
use std::sync::Arc;

pub struct FixedOcr(pub &'static str);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: DynamicImage) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

pub struct FixedRecognizer(pub &'static str);

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    async fn recognize(&self, _wav: Vec<u8>) -> Result<String, TranscribeError> {
        Ok(self.0.to_string())
    }
}

pub struct ToneFetcher;

#[async_trait]
impl MediaFetcher for ToneFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedAudio, FetchError> {
        let dir = tempfile::tempdir()?;
        write_tone(&dir.path().join("remote_audio.wav"), 16000, 1);
        let path = locate_artifact(dir.path())?;
        Ok(FetchedAudio::new(path, dir))
    }
}

/// Echoes the prompt length so tests can tell a generation happened.
pub struct EchoGenerator;

#[async_trait]
impl GenerationService for EchoGenerator {
    fn name(&self) -> &str {
        "Echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let context = prompt
            .split("Context:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\nUser Query:").next())
            .unwrap_or_default();
        Ok(format!("grounded on: {}", context.lines().next().unwrap_or_default()))
    }
}

pub fn mock_services(work_dir: &Path) -> ExtractionServices {
    ExtractionServices {
        ocr: Arc::new(FixedOcr("Invoice 42 total due")),
        transcoder: Arc::new(FfmpegTranscoder::new("/nonexistent/bin/ffmpeg")),
        fallback_transcoder: Arc::new(WavResampler::new()),
        recognizer: Arc::new(FixedRecognizer("the river flooded in spring")),
        fetcher: Arc::new(ToneFetcher),
        work_dir: work_dir.to_path_buf(),
    }
}

pub fn write_tone(path: &Path, sample_rate: u32, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..(sample_rate / 4) {
        let value = ((i as f32 * 0.1).sin() * 6000.0) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// One-page PDF with a single line of Courier text.
pub fn write_pdf(path: &Path, text: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
