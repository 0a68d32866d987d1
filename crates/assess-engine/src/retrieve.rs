/// Candidate retrieval: the top-N catalog records by cosine similarity to the query.
use tracing::{debug, warn};

use crate::index::{cosine_similarity, TextIndex};
use crate::model::Candidate;

pub const DEFAULT_CANDIDATE_POOL: usize = 30;

/// Embed the query once and return up to `n` candidates, best first.
///
/// Has no error path: an embedding failure is logged and yields no candidates.
pub async fn retrieve_candidates(index: &TextIndex, query: &str, n: usize) -> Vec<Candidate> {
    if index.is_empty() || n == 0 {
        return Vec::new();
    }
    let query_vector = match index.embed(query).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "query embedding failed, no candidates retrieved");
            return Vec::new();
        }
    };
    let scores: Vec<f32> = index
        .vectors()
        .iter()
        .map(|v| cosine_similarity(&query_vector, v))
        .collect();
    let candidates = top_n(&scores, n);
    debug!(
        retrieved = candidates.len(),
        best = candidates.first().map(|c| c.similarity_score),
        "candidates retrieved"
    );
    candidates
}

/// Select the `n` highest scores. Equal scores keep ascending catalog order.
pub fn top_n(scores: &[f32], n: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = scores
        .iter()
        .enumerate()
        .map(|(index, &similarity_score)| Candidate {
            index,
            similarity_score,
        })
        .collect();
    // Stable sort: ties stay in catalog order. NaN ranks below every real score.
    candidates.sort_by(|a, b| {
        rank_key(b.similarity_score).total_cmp(&rank_key(a.similarity_score))
    });
    candidates.truncate(n);
    candidates
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
