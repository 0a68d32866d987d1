/// Ranking strategies: how a request's requirement is extracted and how its candidates
/// are reranked.
///
/// Selected once at startup and injected into the pipeline. Neither method can fail:
/// the oracle-backed strategy absorbs every oracle failure by falling back to the
/// heuristic behavior.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::OracleError;
use crate::extract::{build_extraction_prompt, extract_keywords, parse_requirement_response};
use crate::model::{Candidate, StructuredRequirement};
use crate::oracle::CompletionService;
use crate::rerank::{apply_ranking, build_rerank_prompt, parse_digit_runs, similarity_order};

#[async_trait]
pub trait RankingStrategy: Send + Sync {
    async fn extract(&self, query: &str) -> StructuredRequirement;

    /// Returns at most `top_k` candidates, all drawn from `candidates`.
    async fn rerank(
        &self,
        query: &str,
        requirement: &StructuredRequirement,
        catalog: &Catalog,
        candidates: &[Candidate],
        top_k: usize,
    ) -> Vec<Candidate>;

    fn name(&self) -> &'static str;
}

/// Keyword extraction and similarity-order reranking. Needs no network.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

#[async_trait]
impl RankingStrategy for HeuristicStrategy {
    async fn extract(&self, query: &str) -> StructuredRequirement {
        extract_keywords(query)
    }

    async fn rerank(
        &self,
        _query: &str,
        _requirement: &StructuredRequirement,
        _catalog: &Catalog,
        candidates: &[Candidate],
        top_k: usize,
    ) -> Vec<Candidate> {
        similarity_order(candidates, top_k)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Delegates extraction and reranking to a language model, one bounded call each.
pub struct OracleStrategy {
    client: Arc<dyn CompletionService>,
    timeout: Duration,
}

impl OracleStrategy {
    pub fn new(client: Arc<dyn CompletionService>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        tokio::time::timeout(self.timeout, self.client.complete(prompt))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl RankingStrategy for OracleStrategy {
    async fn extract(&self, query: &str) -> StructuredRequirement {
        let reply = match self.ask(&build_extraction_prompt(query)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, model = self.client.model_name(), "oracle extraction failed, using keyword fallback");
                return extract_keywords(query);
            }
        };
        match parse_requirement_response(&reply) {
            Some(requirement) => {
                info!(key_focus = %requirement.key_focus, "oracle extracted requirement");
                requirement
            }
            None => {
                warn!("oracle extraction reply had no JSON object, using keyword fallback");
                extract_keywords(query)
            }
        }
    }

    async fn rerank(
        &self,
        query: &str,
        requirement: &StructuredRequirement,
        catalog: &Catalog,
        candidates: &[Candidate],
        top_k: usize,
    ) -> Vec<Candidate> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let prompt = build_rerank_prompt(query, requirement, catalog, candidates, top_k);
        let reply = match self.ask(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, model = self.client.model_name(), "oracle rerank failed, using similarity order");
                return similarity_order(candidates, top_k);
            }
        };
        let Some(positions) = parse_digit_runs(&reply) else {
            warn!("oracle rerank reply had no positions, using similarity order");
            return similarity_order(candidates, top_k);
        };
        let reranked = apply_ranking(candidates, &positions, top_k);
        debug!(positions = positions.len(), reranked = reranked.len(), "oracle reranked candidates");
        reranked
    }

    fn name(&self) -> &'static str {
        "oracle"
    }
}
