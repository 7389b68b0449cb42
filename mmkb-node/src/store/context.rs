use crate::store::KnowledgeStore;
use tracing::{debug, info, warn};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_MAX_CHARS: usize = 3000;

/// Turns a query into a bounded grounding string.
#[derive(Clone)]
pub struct ContextBuilder {
    store: KnowledgeStore,
    limit: usize,
    max_chars: usize,
}

impl ContextBuilder {
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            store,
            limit: DEFAULT_LIMIT,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_limits(store: KnowledgeStore, limit: usize, max_chars: usize) -> Self {
        Self {
            store,
            limit,
            max_chars,
        }
    }

    pub fn build_context(&self, query: &str) -> String {
        self.build_context_with(query, self.max_chars)
    }

    pub fn build_context_with(&self, query: &str, max_chars: usize) -> String {
        let results = self.store.search(query, self.limit).unwrap_or_else(|err| {
            warn!("Knowledge store search unavailable: {}", err);
            Vec::new()
        });

        if results.is_empty() {
            info!("No keyword match for '{}'. Using all available data as fallback.", query);
            let corpus = self.store.all_text().unwrap_or_else(|err| {
                warn!("Knowledge store corpus unavailable: {}", err);
                String::new()
            });
            return truncate_chars(&corpus, max_chars);
        }

        let parts: Vec<String> = results
            .iter()
            .map(|doc| {
                debug!("Matched {}: {}...", doc.name, snippet(&doc.text));
                format!("From {}:\n{}\n", doc.name, doc.text)
            })
            .collect();

        truncate_chars(&parts.join("\n"), max_chars)
    }
}

/// Plain character cut; may end mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn snippet(text: &str) -> String {
    truncate_chars(text, 300).replace('\n', " ")
}
