use axum::Router;
use mmkb_node::api::{self, AppState};
use mmkb_node::config::AppConfig;
use mmkb_node::providers::Extractor;
use mmkb_node::services::{ExtractionServices, GeminiClient, QueryEngine};
use mmkb_node::store::{ContextBuilder, KnowledgeStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mmkb_node=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mmkb-node server");

    let config = AppConfig::load()?;
    std::fs::create_dir_all(&config.work_dir)?;

    let store = KnowledgeStore::new(&config.database_path);
    store.init()?;

    let services = ExtractionServices::from_config(&config)?;
    let generator = Arc::new(GeminiClient::from_config(&config.generation)?);
    let context = ContextBuilder::with_limits(
        store.clone(),
        config.retrieval.limit,
        config.retrieval.max_chars,
    );

    let state = AppState {
        extractor: Arc::new(Extractor::new(&services)),
        store,
        query: Arc::new(QueryEngine::new(context, generator)),
        ingest: config.ingest.clone(),
        work_dir: config.work_dir.clone(),
    };

    let app = Router::new()
        .nest("/api/v1", api::create_router(state))
        .fallback(|| async { "mmkb-node server" });

    info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
