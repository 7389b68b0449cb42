use crate::error::ExtractError;
use crate::models::ContentType;
use crate::providers::ContentProvider;
use crate::services::OcrEngine;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// 3x3 sharpening kernel: strong centre weight, uniform negative ring.
const SHARPEN_KERNEL: [f32; 9] = [
    -0.125, -0.125, -0.125, //
    -0.125, 2.0, -0.125, //
    -0.125, -0.125, -0.125,
];

pub struct ImageProvider {
    ocr: Arc<dyn OcrEngine>,
}

impl ImageProvider {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Grayscale then sharpen, ready for OCR.
    pub(crate) fn preprocess(image: &DynamicImage) -> DynamicImage {
        image.grayscale().filter3x3(&SHARPEN_KERNEL)
    }
}

#[async_trait]
impl ContentProvider for ImageProvider {
    fn content_type(&self) -> ContentType {
        ContentType::Image
    }

    async fn extract_text(&self, file_path: &Path) -> Result<String, ExtractError> {
        let path = file_path.to_owned();
        let prepared = tokio::task::spawn_blocking(move || -> Result<DynamicImage, image::ImageError> {
            let decoded = image::open(&path)?;
            debug!("Decoded {} ({}x{})", path.display(), decoded.width(), decoded.height());
            Ok(ImageProvider::preprocess(&decoded))
        })
        .await
        .map_err(|e| ExtractError::failed(ContentType::Image, format!("decoder task aborted: {}", e)))?
        .map_err(|e| ExtractError::failed(ContentType::Image, e))?;

        self.ocr
            .recognize(prepared)
            .await
            .map_err(|e| ExtractError::failed(ContentType::Image, e))
    }
}
