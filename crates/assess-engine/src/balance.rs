/// Composition balancing: enforce the knowledge/personality mix a requirement implies.
///
/// When both a knowledge and a personality test are needed, up to 60% of the slots go
/// to knowledge-type records and up to 40% to personality-type records, each bucket in
/// its reranked order. The split is positional: the merged list is not re-sorted by
/// score, so a higher-scoring "Other" record can land after a quota record.
use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::model::{
    Candidate, StructuredRequirement, TestCategory, KNOWLEDGE_AND_SKILLS,
    PERSONALITY_AND_BEHAVIOR,
};

pub fn knowledge_quota(top_k: usize) -> usize {
    top_k * 6 / 10
}

pub fn personality_quota(top_k: usize) -> usize {
    top_k * 4 / 10
}

pub fn balance(
    reranked: &[Candidate],
    requirement: &StructuredRequirement,
    catalog: &Catalog,
    top_k: usize,
) -> Vec<Candidate> {
    let head: Vec<Candidate> = reranked.iter().take(top_k).copied().collect();
    if requirement.test_types_needed.len() < 2 {
        return head;
    }
    if !(requirement.needs(KNOWLEDGE_AND_SKILLS) && requirement.needs(PERSONALITY_AND_BEHAVIOR)) {
        return head;
    }

    let category_of = |c: &Candidate| {
        catalog
            .get(c.index)
            .map(|r| r.test_category())
            .unwrap_or(TestCategory::Other)
    };

    let mut selected: Vec<usize> = Vec::with_capacity(top_k);
    let quotas = [
        (TestCategory::Knowledge, knowledge_quota(top_k)),
        (TestCategory::Personality, personality_quota(top_k)),
    ];
    for (category, quota) in quotas {
        selected.extend(
            reranked
                .iter()
                .enumerate()
                .filter(|(_, c)| category_of(c) == category)
                .take(quota)
                .map(|(pos, _)| pos),
        );
    }

    let mut taken: HashSet<usize> = selected.iter().copied().collect();
    for pos in 0..reranked.len() {
        if selected.len() >= top_k {
            break;
        }
        if taken.insert(pos) {
            selected.push(pos);
        }
    }

    selected.truncate(top_k);
    selected.into_iter().map(|pos| reranked[pos]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentRecord, COGNITIVE};

    fn catalog(types: &[&str]) -> Catalog {
        let records: Vec<AssessmentRecord> = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                serde_json::from_value(serde_json::json!({
                    "url": format!("u{i}"),
                    "name": format!("Test {i}"),
                    "test_type": t,
                }))
                .unwrap()
            })
            .collect();
        Catalog::from_records(records)
    }

    fn in_order(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                index: i,
                similarity_score: 1.0 - i as f32 * 0.01,
            })
            .collect()
    }

    fn requirement(labels: &[&str]) -> StructuredRequirement {
        StructuredRequirement {
            test_types_needed: labels.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn indices(c: &[Candidate]) -> Vec<usize> {
        c.iter().map(|c| c.index).collect()
    }

    #[test]
    fn quotas_truncate() {
        let k: Vec<usize> = (1..=10).map(knowledge_quota).collect();
        let p: Vec<usize> = (1..=10).map(personality_quota).collect();
        assert_eq!(k, vec![0, 1, 1, 2, 3, 3, 4, 4, 5, 6]);
        assert_eq!(p, vec![0, 0, 1, 1, 2, 2, 2, 3, 3, 4]);
    }

    #[test]
    fn fewer_than_two_types_is_a_plain_cut() {
        let cat = catalog(&["K"; 12]);
        let got = balance(&in_order(12), &requirement(&[KNOWLEDGE_AND_SKILLS]), &cat, 10);
        assert_eq!(indices(&got), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn two_types_without_the_pair_is_a_plain_cut() {
        let cat = catalog(&["P", "K", "P", "K"]);
        let got = balance(
            &in_order(4),
            &requirement(&[KNOWLEDGE_AND_SKILLS, COGNITIVE]),
            &cat,
            3,
        );
        assert_eq!(indices(&got), vec![0, 1, 2]);
    }

    #[test]
    fn sixty_forty_split_with_positional_order() {
        // 8 K then 8 P then 2 Other.
        let mut types = vec!["K"; 8];
        types.extend(vec!["P"; 8]);
        types.extend(vec!["", "A"]);
        let cat = catalog(&types);
        let both = requirement(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR]);

        let got = balance(&in_order(18), &both, &cat, 10);
        assert_eq!(indices(&got), vec![0, 1, 2, 3, 4, 5, 8, 9, 10, 11]);
    }

    #[test]
    fn shortfall_is_filled_in_reranked_order_including_other() {
        // Only one P available; Other records fill the gap.
        let cat = catalog(&["", "K", "", "P", "K", "C", "K"]);
        let both = requirement(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR, COGNITIVE]);
        let got = balance(&in_order(7), &both, &cat, 5);
        // K quota 3 -> 1,4,6; P quota 2 -> 3; fill -> 0.
        assert_eq!(indices(&got), vec![1, 4, 6, 3, 0]);
    }

    #[test]
    fn other_item_can_be_demoted_below_quota_items() {
        let cat = catalog(&["", "K", "P"]);
        let both = requirement(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR]);
        let got = balance(&in_order(3), &both, &cat, 3);
        assert_eq!(indices(&got), vec![1, 2, 0]);
    }

    #[test]
    fn never_exceeds_top_k_or_invents_candidates() {
        let cat = catalog(&["K", "P"]);
        let both = requirement(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR]);
        let got = balance(&in_order(2), &both, &cat, 10);
        assert_eq!(indices(&got), vec![0, 1]);
        assert!(balance(&[], &both, &cat, 10).is_empty());
    }

    #[test]
    fn quota_caps_hold_at_top_k_ten() {
        let mut types = vec!["K"; 20];
        types.extend(vec!["P"; 20]);
        let cat = catalog(&types);
        let both = requirement(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR]);
        let mut interleaved: Vec<Candidate> = Vec::new();
        for i in 0..20 {
            interleaved.push(Candidate { index: i, similarity_score: 0.5 });
            interleaved.push(Candidate { index: 20 + i, similarity_score: 0.5 });
        }
        let got = balance(&interleaved, &both, &cat, 10);
        let knowledge = got.iter().filter(|c| c.index < 20).count();
        let personality = got.len() - knowledge;
        assert_eq!(got.len(), 10);
        assert!(knowledge <= 6);
        assert!(personality <= 4);
    }
}
