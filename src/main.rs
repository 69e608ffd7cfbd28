//! Listing Advisor server binary.
//!
//! Loads configuration, wires the adapters into the turn pipeline, and serves
//! the chat API.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use listing_advisor::adapters::ai::{GeminiConfig, GeminiProvider};
use listing_advisor::adapters::http::{app_router, AppState};
use listing_advisor::adapters::knowledge::{RemoteIndex, RemoteIndexConfig};
use listing_advisor::adapters::storage::SqliteStore;
use listing_advisor::application::pipeline::TurnPipeline;
use listing_advisor::config::AppConfig;
use listing_advisor::domain::foundation::ConversationId;
use listing_advisor::ports::{ConversationStore, IndexCatalog, KnowledgeIndex, LanguageModel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let llm: Arc<dyn LanguageModel> = Arc::new(GeminiProvider::new(
        GeminiConfig::new(config.ai.gemini_api_key.clone().unwrap_or_default())
            .with_model(&config.ai.model)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    ));

    let en_index: Arc<dyn KnowledgeIndex> = Arc::new(RemoteIndex::new(
        RemoteIndexConfig::new(&config.knowledge.retrieval_url, &config.knowledge.en_collection)
            .with_timeout(config.knowledge.timeout()),
    ));
    let mut catalog = IndexCatalog::new().with_english(en_index);
    if let Some(ar_collection) = &config.knowledge.ar_collection {
        let ar_index: Arc<dyn KnowledgeIndex> = Arc::new(RemoteIndex::new(
            RemoteIndexConfig::new(&config.knowledge.retrieval_url, ar_collection)
                .with_timeout(config.knowledge.timeout()),
        ));
        catalog = catalog.with_arabic(ar_index);
    }

    let store: Arc<dyn ConversationStore> =
        Arc::new(SqliteStore::connect(&config.storage.database_url).await?);

    let pipeline = Arc::new(
        TurnPipeline::new(llm, Arc::new(catalog), store).with_top_k(config.knowledge.top_k),
    );
    let conversation_id = ConversationId::new(config.server.conversation_id.clone())?;
    let state = AppState::new(pipeline, conversation_id);

    let addr = config.server.socket_addr();
    info!(%addr, model = %config.ai.model, "starting listing advisor");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state)).await?;

    Ok(())
}
