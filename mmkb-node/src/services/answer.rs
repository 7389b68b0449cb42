use crate::services::generation::GenerationService;
use crate::store::ContextBuilder;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const NO_CONTEXT_ANSWER: &str = "No relevant information found in the knowledge base.";

const PREAMBLE: &str = "You are a smart AI assistant. Answer the user's query using only the context below.\n\
If context doesn't contain relevant information, say so clearly.";

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nUser Query:\n{}\n\nAnswer:",
        PREAMBLE, context, query
    )
}

pub struct QueryEngine {
    context: ContextBuilder,
    generator: Arc<dyn GenerationService>,
}

impl QueryEngine {
    pub fn new(context: ContextBuilder, generator: Arc<dyn GenerationService>) -> Self {
        Self { context, generator }
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.context
    }

    /// Always yields an answer string; generation failures become a diagnostic.
    pub async fn answer(&self, query: &str) -> String {
        let builder = self.context.clone();
        let search_query = query.to_string();
        let context = match tokio::task::spawn_blocking(move || builder.build_context(&search_query)).await {
            Ok(context) => context,
            Err(err) => {
                error!("Context retrieval aborted: {}", err);
                String::new()
            }
        };
        if context.trim().is_empty() {
            return NO_CONTEXT_ANSWER.to_string();
        }

        info!("Sending {} characters of context to {}", context.chars().count(), self.generator.name());
        debug!("Context preview: {}", crate::store::context::truncate_chars(&context, 500));

        let prompt = build_prompt(&context, query);
        match self.generator.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                error!("{} generation failed: {}", self.generator.name(), err);
                format!("⚠️ {} API Error: {}", self.generator.name(), err)
            }
        }
    }
}
