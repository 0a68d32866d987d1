/// Text index over the catalog.
///
/// Holds one vector per catalog record, in catalog order, and projects query text into
/// the same space. Two modes share this contract: dense (fastembed sentence embeddings)
/// and sparse (TF-IDF fit on the catalog). The mode is chosen once at startup.
pub mod stop_words;
pub mod tfidf;

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::IndexError;
use assess_common::embedding::Embedder;
use tfidf::{TfIdfVectorizer, DEFAULT_MAX_FEATURES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Dense,
    Sparse,
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexMode::Dense => f.write_str("dense"),
            IndexMode::Sparse => f.write_str("sparse"),
        }
    }
}

enum Vectorizer {
    Dense(Arc<Embedder>),
    Sparse(TfIdfVectorizer),
}

pub struct TextIndex {
    vectorizer: Vectorizer,
    vectors: Vec<Vec<f32>>,
}

impl TextIndex {
    /// Fit a TF-IDF vectorizer on the catalog and vectorize every record. Never fails,
    /// including for an empty catalog or records with empty fields.
    pub fn build_sparse(catalog: &Catalog) -> Self {
        let texts = document_texts(catalog);
        let vectorizer = TfIdfVectorizer::fit(&texts, DEFAULT_MAX_FEATURES);
        let vectors = texts.iter().map(|t| vectorizer.transform(t)).collect();
        info!(
            records = catalog.len(),
            vocabulary = vectorizer.vocabulary_len(),
            "built sparse index"
        );
        Self {
            vectorizer: Vectorizer::Sparse(vectorizer),
            vectors,
        }
    }

    /// Batch-encode every record with the sentence-embedding model.
    pub async fn build_dense(catalog: &Catalog, embedder: Arc<Embedder>) -> Result<Self, IndexError> {
        let texts = document_texts(catalog);
        let vectors = embedder.embed_documents(&texts).await?;
        info!(
            records = vectors.len(),
            dimensions = embedder.dimensions(),
            "built dense index"
        );
        Ok(Self {
            vectorizer: Vectorizer::Dense(embedder),
            vectors,
        })
    }

    /// Build in dense mode when an embedder is available, otherwise (or if encoding the
    /// catalog fails) in sparse mode.
    pub async fn build(catalog: &Catalog, embedder: Option<Arc<Embedder>>) -> Self {
        let Some(embedder) = embedder else {
            return Self::build_sparse(catalog);
        };
        match Self::build_dense(catalog, embedder).await {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "dense index build failed, using sparse index");
                Self::build_sparse(catalog)
            }
        }
    }

    /// Project arbitrary text into the index space.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        match &self.vectorizer {
            Vectorizer::Dense(embedder) => Ok(embedder.embed_query(text).await?),
            Vectorizer::Sparse(vectorizer) => Ok(vectorizer.transform(text)),
        }
    }

    pub fn mode(&self) -> IndexMode {
        match self.vectorizer {
            Vectorizer::Dense(_) => IndexMode::Dense,
            Vectorizer::Sparse(_) => IndexMode::Sparse,
        }
    }

    /// Record vectors in catalog order.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn document_texts(catalog: &Catalog) -> Vec<String> {
    catalog.records().iter().map(|r| r.index_text()).collect()
}

/// Cosine similarity. 0 when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
