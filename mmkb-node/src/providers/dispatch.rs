//! Extraction dispatcher: classify a path or URL, route it to the matching
//! provider and fold every outcome into an [`Extraction`].

use crate::models::{ContentType, Extraction, Format};
use crate::providers::registry::ProviderRegistry;
use crate::providers::remote::RemoteProvider;
use crate::services::ExtractionServices;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Extractor {
    registry: ProviderRegistry,
    remote: RemoteProvider,
}

impl Extractor {
    pub fn new(services: &ExtractionServices) -> Self {
        Self {
            registry: ProviderRegistry::new(services),
            remote: RemoteProvider::new(services.fetcher.clone(), Arc::new(services.media_pipeline())),
        }
    }

    /// Never fails: provider errors and unsupported inputs come back as
    /// variants of the result.
    pub async fn extract(&self, path_or_url: &str) -> Extraction {
        let content_type = match ContentType::classify(path_or_url) {
            Format::Supported(content_type) => content_type,
            Format::Unsupported { extension } => {
                warn!("Unsupported file type '{}' for {}", extension, path_or_url);
                return Extraction::Unsupported { extension };
            }
        };

        info!("Extracting {} as {:?}", path_or_url, content_type);

        // Every file-backed type is registered; only remote links miss.
        let result = match self.registry.get_provider(&content_type) {
            Some(provider) => provider.extract_text(Path::new(path_or_url)).await,
            None => self.remote.extract_text(path_or_url).await,
        };

        let extraction = Extraction::from_result(content_type, result);
        match &extraction {
            Extraction::Failed(err) => warn!("{}: {}", path_or_url, err),
            other => debug!("{} -> {:?}", path_or_url, other.status()),
        }
        extraction
    }

    /// Rendered form of [`Extractor::extract`]: the text, a sentinel, or a
    /// diagnostic.
    pub async fn extract_text(&self, path_or_url: &str) -> String {
        self.extract(path_or_url).await.to_string()
    }
}
