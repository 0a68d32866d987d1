/// Offline evaluation: mean Recall@K over a labelled query set.
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::format::{MAX_TOP_K, MIN_TOP_K};
use crate::pipeline::Recommender;

/// One labelled pair: an assessment known to be relevant for a query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroundTruthRow {
    pub query: String,
    pub assessment_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecall {
    pub query: String,
    pub relevant: usize,
    pub retrieved: usize,
    pub hits: usize,
    pub recall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub k: usize,
    pub queries: usize,
    pub mean_recall: f64,
    pub per_query: Vec<QueryRecall>,
}

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthRow>, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Distinct relevant URLs among the first `k` of `recommended`.
pub fn hits_at_k(recommended: &[String], relevant: &HashSet<String>, k: usize) -> usize {
    recommended
        .iter()
        .take(k)
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|url| relevant.contains(*url))
        .count()
}

/// Fraction of `relevant` found among the first `k` of `recommended`. Zero when nothing
/// is relevant.
pub fn recall_at_k(recommended: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    hits_at_k(recommended, relevant, k) as f64 / relevant.len() as f64
}

/// Group rows by query (first-seen order), run each query once, and average recall.
///
/// `k` is clamped into the same 1..=10 range as a recommendation request, and the
/// report carries the clamped value.
pub async fn evaluate(recommender: &Recommender, rows: &[GroundTruthRow], k: usize) -> EvalReport {
    let k = k.clamp(MIN_TOP_K, MAX_TOP_K);
    let mut order: Vec<&str> = Vec::new();
    let mut relevant: BTreeMap<&str, HashSet<String>> = BTreeMap::new();
    for row in rows {
        let urls = relevant.entry(row.query.as_str()).or_insert_with(|| {
            order.push(row.query.as_str());
            HashSet::new()
        });
        urls.insert(row.assessment_url.clone());
    }

    let mut per_query = Vec::with_capacity(order.len());
    for query in order {
        let expected = &relevant[query];
        let recommended: Vec<String> = match recommender.recommend(query, k as i64).await {
            Ok(recs) => recs.into_iter().map(|r| r.record.url).collect(),
            Err(e) => {
                warn!(query, error = %e, "evaluation query rejected");
                Vec::new()
            }
        };
        let recall = recall_at_k(&recommended, expected, k);
        let hits = hits_at_k(&recommended, expected, k);
        per_query.push(QueryRecall {
            query: query.to_string(),
            relevant: expected.len(),
            retrieved: recommended.len(),
            hits,
            recall,
        });
    }

    let mean_recall = if per_query.is_empty() {
        0.0
    } else {
        per_query.iter().map(|q| q.recall).sum::<f64>() / per_query.len() as f64
    };
    info!(queries = per_query.len(), k, mean_recall, "evaluation complete");
    EvalReport {
        k,
        queries: per_query.len(),
        mean_recall,
        per_query,
    }
}
