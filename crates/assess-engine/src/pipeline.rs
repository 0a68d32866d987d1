/// The recommendation pipeline: extract, retrieve, rerank, balance.
use std::sync::Arc;

use tracing::{debug, info};

use crate::balance::balance;
use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::format::{clamp_top_k, coerce_top_k, to_api};
use crate::index::{IndexMode, TextIndex};
use crate::model::Recommendation;
use crate::retrieve::{retrieve_candidates, DEFAULT_CANDIDATE_POOL};
use crate::strategy::RankingStrategy;
use assess_common::api::{RecommendParams, RecommendResponse};

/// Immutable after construction; shared across concurrent requests.
pub struct Recommender {
    catalog: Catalog,
    index: TextIndex,
    strategy: Arc<dyn RankingStrategy>,
    candidate_pool: usize,
}

impl Recommender {
    pub fn new(catalog: Catalog, index: TextIndex, strategy: Arc<dyn RankingStrategy>) -> Self {
        Self {
            catalog,
            index,
            strategy,
            candidate_pool: DEFAULT_CANDIDATE_POOL,
        }
    }

    pub fn with_candidate_pool(mut self, candidate_pool: usize) -> Self {
        self.candidate_pool = candidate_pool;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index_mode(&self) -> IndexMode {
        self.index.mode()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Recommend up to `top_k` catalog records for a free-text query.
    ///
    /// `top_k` is clamped into 1..=10. Only an empty query is rejected; every oracle or
    /// embedding failure degrades to a deterministic fallback instead.
    pub async fn recommend(
        &self,
        query: &str,
        top_k: i64,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecommendError::InvalidInput(
                "query must be a non-empty string".to_string(),
            ));
        }
        let top_k = clamp_top_k(top_k);
        if self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.candidate_pool.max(top_k);
        let (requirement, candidates) = tokio::join!(
            self.strategy.extract(query),
            retrieve_candidates(&self.index, query, pool),
        );
        debug!(
            key_focus = %requirement.key_focus,
            test_types = requirement.test_types_needed.len(),
            candidates = candidates.len(),
            "requirement extracted"
        );

        let reranked = self
            .strategy
            .rerank(query, &requirement, &self.catalog, &candidates, top_k)
            .await;
        let selected = balance(&reranked, &requirement, &self.catalog, top_k);

        let recommendations: Vec<Recommendation> = selected
            .into_iter()
            .filter_map(|c| {
                self.catalog.get(c.index).map(|record| Recommendation {
                    record: record.clone(),
                    similarity_score: c.similarity_score,
                })
            })
            .collect();
        info!(
            top_k,
            returned = recommendations.len(),
            strategy = self.strategy.name(),
            "recommendation complete"
        );
        Ok(recommendations)
    }

    /// The service-boundary form of [`Recommender::recommend`].
    pub async fn respond(&self, params: &RecommendParams) -> Result<RecommendResponse, RecommendError> {
        let top_k = coerce_top_k(params.top_k.as_ref())?;
        let recommendations = self.recommend(&params.query, top_k).await?;
        Ok(RecommendResponse {
            recommended_assessments: recommendations.iter().map(to_api).collect(),
        })
    }
}
