use crate::models::ContentType;
use crate::providers::{
    audio::MediaProvider, document::DocumentProvider, image_ocr::ImageProvider, markdown::MarkdownProvider,
    pdf::PdfProvider, presentation::PresentationProvider, text::TextProvider, ContentProvider,
};
use crate::services::ExtractionServices;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

pub type SharedProvider = Arc<dyn ContentProvider>;

/// File providers keyed by content type. Remote links are not file-backed and
/// are handled by the dispatcher directly.
pub struct ProviderRegistry {
    providers: HashMap<ContentType, SharedProvider>,
}

impl ProviderRegistry {
    pub fn new(services: &ExtractionServices) -> Self {
        let pipeline = Arc::new(services.media_pipeline());
        let mut registry = Self {
            providers: HashMap::new(),
        };

        registry.register(Arc::new(PdfProvider::new()));
        registry.register(Arc::new(DocumentProvider::new()));
        registry.register(Arc::new(PresentationProvider::new()));
        registry.register(Arc::new(TextProvider::new()));
        registry.register(Arc::new(MarkdownProvider::new()));
        registry.register(Arc::new(ImageProvider::new(services.ocr.clone())));
        registry.register(Arc::new(MediaProvider::audio(pipeline.clone())));
        registry.register(Arc::new(MediaProvider::video(pipeline)));

        registry
    }

    fn register(&mut self, provider: SharedProvider) {
        self.providers.insert(provider.content_type(), provider);
    }

    pub fn get_provider(&self, content_type: &ContentType) -> Option<SharedProvider> {
        self.providers.get(content_type).cloned()
    }

    pub fn get_provider_by_extension(&self, extension: &str) -> Option<(ContentType, SharedProvider)> {
        let content_type = ContentType::from_extension(extension)?;
        self.get_provider(&content_type).map(|provider| (content_type, provider))
    }
}
