/// Relevance reranking: the prompt shown to the oracle, parsing of its reply, and the
/// merge of the oracle's order with the similarity order.
use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::model::{Candidate, StructuredRequirement};

/// Only the first candidates are shown to the oracle.
pub const RERANK_WINDOW: usize = 20;

pub fn build_rerank_prompt(
    query: &str,
    requirement: &StructuredRequirement,
    catalog: &Catalog,
    candidates: &[Candidate],
    top_k: usize,
) -> String {
    let listing: Vec<String> = candidates
        .iter()
        .take(RERANK_WINDOW)
        .enumerate()
        .filter_map(|(i, c)| {
            let record = catalog.get(c.index)?;
            let categories: Vec<&str> = record.categories.iter().map(String::as_str).collect();
            Some(format!("{}. {} - {}", i + 1, record.name, categories.join(", ")))
        })
        .collect();

    format!(
        "Given this job requirement:\n\"{query}\"\n\n\
Extracted requirements:\n\
- Technical skills: {skills}\n\
- Soft skills: {soft}\n\
- Test types needed: {types}\n\n\
And these assessment options:\n{listing}\n\n\
Rank the top {top_k} most relevant assessments by their index numbers.\n\
Consider:\n\
- Technical skills match\n\
- Soft skills match\n\
- Test type appropriateness\n\
- Balance between knowledge and behavioral tests if both needed\n\n\
Return ONLY a comma-separated list of index numbers (e.g., \"3,1,5,7,2,4,8,9,6,10\")",
        skills = join_or_none(&requirement.skills),
        soft = join_or_none(&requirement.soft_skills),
        types = join_or_none(&requirement.test_types_needed),
        listing = listing.join("\n"),
    )
}

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}

/// Every run of ASCII digits in the reply, in order of appearance. `None` when the reply
/// contains no digits at all. Runs too large for `usize` are dropped.
pub fn parse_digit_runs(text: &str) -> Option<Vec<usize>> {
    let runs: Vec<&str> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .collect();
    if runs.is_empty() {
        return None;
    }
    Some(runs.into_iter().filter_map(|r| r.parse().ok()).collect())
}

/// Reorder `candidates` by 1-based prompt positions.
///
/// Positions outside the presented window and repeats are skipped. Once the valid
/// positions run out, unselected candidates are appended in similarity order until
/// `top_k` is reached.
pub fn apply_ranking(candidates: &[Candidate], positions: &[usize], top_k: usize) -> Vec<Candidate> {
    let window = candidates.len().min(RERANK_WINDOW);
    let mut taken: HashSet<usize> = HashSet::new();
    let mut ranked = Vec::with_capacity(top_k);

    for &position in positions {
        if ranked.len() >= top_k {
            break;
        }
        if position == 0 || position > window {
            continue;
        }
        let slot = position - 1;
        if taken.insert(slot) {
            ranked.push(candidates[slot]);
        }
    }

    for (slot, candidate) in candidates.iter().enumerate() {
        if ranked.len() >= top_k {
            break;
        }
        if taken.insert(slot) {
            ranked.push(*candidate);
        }
    }
    ranked
}

/// The reranker's fallback: the first `top_k` in similarity order.
pub fn similarity_order(candidates: &[Candidate], top_k: usize) -> Vec<Candidate> {
    candidates.iter().take(top_k).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssessmentRecord;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                index: i,
                similarity_score: 1.0 - i as f32 * 0.01,
            })
            .collect()
    }

    fn indices(c: &[Candidate]) -> Vec<usize> {
        c.iter().map(|c| c.index).collect()
    }

    #[test]
    fn digit_runs_from_clean_and_noisy_replies() {
        assert_eq!(parse_digit_runs("3,1,5"), Some(vec![3, 1, 5]));
        assert_eq!(
            parse_digit_runs("Ranking: 2, then 7 and finally #12."),
            Some(vec![2, 7, 12])
        );
        assert_eq!(parse_digit_runs("no numbers here"), None);
        assert_eq!(parse_digit_runs(""), None);
        assert_eq!(
            parse_digit_runs("1, 99999999999999999999999999, 2"),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn applies_oracle_order() {
        let got = apply_ranking(&candidates(30), &[3, 1, 2], 3);
        assert_eq!(indices(&got), vec![2, 0, 1]);
    }

    #[test]
    fn skips_out_of_range_and_repeated_positions() {
        let got = apply_ranking(&candidates(30), &[0, 25, 4, 4, 21, 2], 2);
        assert_eq!(indices(&got), vec![3, 1]);
    }

    #[test]
    fn fills_shortfall_in_similarity_order() {
        let got = apply_ranking(&candidates(30), &[5, 2], 5);
        assert_eq!(indices(&got), vec![4, 1, 0, 2, 3]);
    }

    #[test]
    fn fill_can_reach_beyond_the_window() {
        let got = apply_ranking(&candidates(25), &(1..=20).collect::<Vec<_>>(), 22);
        assert_eq!(got.len(), 22);
        assert_eq!(got[20].index, 20);
        assert_eq!(got[21].index, 21);
    }

    #[test]
    fn never_exceeds_top_k_or_input() {
        let got = apply_ranking(&candidates(3), &[1, 2, 3], 10);
        assert_eq!(got.len(), 3);
        assert!(apply_ranking(&[], &[1, 2], 10).is_empty());
        assert_eq!(similarity_order(&candidates(30), 10).len(), 10);
    }

    #[test]
    fn prompt_lists_window_with_one_based_positions() {
        let records: Vec<AssessmentRecord> = (0..25)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "url": format!("u{i}"),
                    "name": format!("Test {i}"),
                    "categories": ["Cat"],
                }))
                .unwrap()
            })
            .collect();
        let catalog = Catalog::from_records(records);
        let requirement = StructuredRequirement::default();
        let prompt = build_rerank_prompt("java", &requirement, &catalog, &candidates(25), 10);
        assert!(prompt.contains("1. Test 0 - Cat"));
        assert!(prompt.contains("20. Test 19 - Cat"));
        assert!(!prompt.contains("21. Test 20"));
        assert!(prompt.contains("Technical skills: none"));
        assert!(prompt.contains("top 10"));
    }
}
