/// Sparse-mode vectorizer: TF-IDF over unigrams and bigrams.
///
/// Fit once on the catalog text and never refit. Queries are projected onto the fitted
/// vocabulary; terms outside it contribute nothing.
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::stop_words::is_stop_word;

pub const DEFAULT_MAX_FEATURES: usize = 500;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfIdfVectorizer {
    /// Fit the vocabulary and inverse document frequencies on `documents`.
    ///
    /// The vocabulary keeps the `max_features` terms with the highest corpus frequency
    /// (ties broken alphabetically), then columns are ordered alphabetically. IDF is
    /// smoothed: `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit(documents: &[String], max_features: usize) -> Self {
        let mut corpus_counts: HashMap<String, u64> = HashMap::new();
        let mut document_frequency: HashMap<String, u32> = HashMap::new();

        for doc in documents {
            for (term, count) in term_counts(doc) {
                *corpus_counts.entry(term.clone()).or_default() += u64::from(count);
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f32;
        let idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        Self { vocabulary, idf }
    }

    /// Project text onto the fitted vocabulary as an L2-normalized TF-IDF vector.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for (term, count) in term_counts(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                vector[column] = count as f32 * self.idf[column];
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }
}

/// Lowercase, tokenize, drop stop words, then emit unigrams and bigrams of what remains.
fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in analyze(text) {
        *counts.entry(term).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn builds_unigrams_and_bigrams_without_stop_words() {
        let terms = analyze("The Java developer with SQL");
        assert_eq!(
            terms,
            vec!["java", "developer", "sql", "java developer", "developer sql"]
        );
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        assert!(analyze("a b c K P").is_empty());
    }

    #[test]
    fn vocabulary_is_capped_by_corpus_frequency() {
        let corpus = docs(&["alpha alpha alpha beta", "alpha gamma", "delta"]);
        let v = TfIdfVectorizer::fit(&corpus, 2);
        assert_eq!(v.vocabulary_len(), 2);
        assert!(v.contains_term("alpha"));
        // alpha=4, "alpha alpha"=2, every other term occurs once.
        assert!(v.contains_term("alpha alpha"));
    }

    #[test]
    fn transform_is_unit_norm_and_ignores_unknown_terms() {
        let corpus = docs(&["java developer test", "personality questionnaire"]);
        let v = TfIdfVectorizer::fit(&corpus, DEFAULT_MAX_FEATURES);
        let q = v.transform("Java kubernetes zebra");
        let norm: f32 = q.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        let unknown = v.transform("kubernetes zebra");
        assert!(unknown.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn query_transform_does_not_change_vocabulary() {
        let corpus = docs(&["java developer test"]);
        let v = TfIdfVectorizer::fit(&corpus, DEFAULT_MAX_FEATURES);
        let before = v.vocabulary_len();
        let _ = v.transform("entirely new words appear here");
        assert_eq!(v.vocabulary_len(), before);
        assert!(!v.contains_term("entirely"));
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let corpus = docs(&["common rare", "common", "common"]);
        let v = TfIdfVectorizer::fit(&corpus, DEFAULT_MAX_FEATURES);
        let q = v.transform("common rare");
        let common = q[v.vocabulary["common"]];
        let rare = q[v.vocabulary["rare"]];
        assert!(rare > common);
    }

    #[test]
    fn empty_corpus_fits_and_projects_to_empty_vector() {
        let v = TfIdfVectorizer::fit(&[], DEFAULT_MAX_FEATURES);
        assert_eq!(v.vocabulary_len(), 0);
        assert!(v.transform("anything").is_empty());
    }
}
