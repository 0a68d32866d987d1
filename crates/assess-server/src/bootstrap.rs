use std::sync::Arc;

use tracing::{info, warn};

use assess_common::embedding::Embedder;
use assess_common::openai::OpenAiClient;
use assess_engine::catalog::Catalog;
use assess_engine::index::{IndexMode, TextIndex};
use assess_engine::pipeline::Recommender;
use assess_engine::strategy::{HeuristicStrategy, OracleStrategy, RankingStrategy};

use crate::config::Config;
use crate::error::AppError;

/// Load the catalog, build the index and pick the ranking strategy.
///
/// Only a broken oracle client configuration is fatal; a missing catalog, an unloadable
/// embedding model or missing credentials all degrade instead.
pub async fn build_recommender(config: &Config) -> Result<Recommender, AppError> {
    let catalog = Catalog::load_with_fallback(&config.catalog_path, &config.fallback_catalog_path);
    info!(records = catalog.len(), "catalog ready");

    let embedder = match config.index_mode {
        IndexMode::Sparse => None,
        IndexMode::Dense => {
            info!("initializing embedding model (may download on first run)");
            match Embedder::new(config.embedding_cache_dir.clone()).await {
                Ok(embedder) => Some(Arc::new(embedder)),
                Err(e) => {
                    warn!(error = %e, "embedding model unavailable, using sparse index");
                    None
                }
            }
        }
    };
    let index = TextIndex::build(&catalog, embedder).await;
    info!(mode = %index.mode(), vectors = index.len(), "index ready");

    let strategy = select_strategy(config)?;
    info!(strategy = strategy.name(), "ranking strategy selected");

    Ok(Recommender::new(catalog, index, strategy).with_candidate_pool(config.candidate_pool))
}

pub fn select_strategy(config: &Config) -> Result<Arc<dyn RankingStrategy>, AppError> {
    if !config.oracle_enabled {
        info!("oracle disabled by configuration");
        return Ok(Arc::new(HeuristicStrategy));
    }
    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY not set, using keyword extraction and similarity ranking");
        return Ok(Arc::new(HeuristicStrategy));
    }
    info!(
        base_url = %config.openai.base_url,
        model = %config.openai.model,
        timeout_ms = config.openai.default_timeout.as_millis(),
        max_retries = config.openai.max_retries,
        "openai client configured"
    );
    let timeout = config.openai.default_timeout;
    let client = OpenAiClient::new(config.openai.clone())?;
    Ok(Arc::new(OracleStrategy::new(Arc::new(client), timeout)))
}
