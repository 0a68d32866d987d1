/// Embedding wrapper around fastembed.
///
/// `TextEmbedding` from fastembed is synchronous and CPU-bound. All embed calls go through
/// `tokio::task::spawn_blocking`. The inner ONNX session is shared behind an `Arc` and
/// accessed only from blocking tasks.
///
/// The all-MiniLM-L6-v2 model takes raw text (no task prefix) and produces 384-dimensional
/// vectors that are compared by cosine similarity.
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CommonError;

const EMBEDDING_DIMENSIONS: usize = 384;
const DOCUMENT_BATCH_SIZE: usize = 32;

/// Wraps fastembed's `TextEmbedding` model for generating dense sentence embeddings.
pub struct Embedder {
    model: Arc<fastembed::TextEmbedding>,
}

impl Embedder {
    /// Initialize the embedding model (all-MiniLM-L6-v2).
    ///
    /// This downloads the model on first run (~90MB) into `cache_dir` when given, or
    /// fastembed's default cache location otherwise.
    pub async fn new(cache_dir: Option<PathBuf>) -> Result<Self, CommonError> {
        let model = tokio::task::spawn_blocking(move || {
            let mut options =
                fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                    .with_show_download_progress(false);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir);
            }
            fastembed::TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| CommonError::Embedding(format!("model initialization failed: {e}")))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Embed catalog documents for indexing.
    ///
    /// Documents are processed in batches to bound peak memory during ONNX inference.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CommonError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let owned = texts.to_vec();
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(owned, Some(DOCUMENT_BATCH_SIZE)))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("document embedding failed: {e}")))
    }

    /// Embed a single query for retrieval.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, CommonError> {
        let input = vec![query.to_string()];
        let model = Arc::clone(&self.model);
        let mut results = tokio::task::spawn_blocking(move || model.embed(input, None))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("query embedding failed: {e}")))?;
        results
            .pop()
            .ok_or_else(|| CommonError::Embedding("empty embedding result".to_string()))
    }

    /// Returns the dimensionality of the embedding vectors (384 for all-MiniLM-L6-v2).
    pub fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}
