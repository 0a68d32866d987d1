use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const KNOWLEDGE_AND_SKILLS: &str = "Knowledge & Skills";
pub const PERSONALITY_AND_BEHAVIOR: &str = "Personality & Behavior";
pub const COGNITIVE: &str = "Cognitive";
pub const COMMUNICATION: &str = "Communication";

/// One catalog entry. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAssessment")]
pub struct AssessmentRecord {
    /// Unique identifier and external reference.
    pub url: String,
    pub name: String,
    pub description: String,
    /// Single-character classification code ("K", "P", ...) or empty.
    pub test_type: String,
    /// Minutes, 0 when unknown.
    pub duration: u32,
    pub adaptive_support: bool,
    pub remote_support: bool,
    pub categories: BTreeSet<String>,
    /// Scraped page text. Kept for reference, not used by the index.
    pub full_text: String,
}

impl AssessmentRecord {
    pub fn test_category(&self) -> TestCategory {
        TestCategory::from_code(&self.test_type)
    }

    /// Text the index is built from: name, description, categories and test type.
    pub fn index_text(&self) -> String {
        let categories: Vec<&str> = self.categories.iter().map(String::as_str).collect();
        format!(
            "{} {} {} {}",
            self.name,
            self.description,
            categories.join(" "),
            self.test_type
        )
    }
}

/// Catalog files come from several scrapers with inconsistent field shapes, so every
/// optional field is read loosely and normalized in `From<RawAssessment>`.
#[derive(Debug, Deserialize)]
struct RawAssessment {
    url: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    test_type: Option<String>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    adaptive_support: Option<Value>,
    #[serde(default)]
    remote_support: Option<Value>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    full_text: Option<String>,
}

impl From<RawAssessment> for AssessmentRecord {
    fn from(raw: RawAssessment) -> Self {
        let mut categories: BTreeSet<String> = raw
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            if let Some(legacy) = raw.category.map(|c| c.trim().to_string()) {
                if !legacy.is_empty() {
                    categories.insert(legacy);
                }
            }
        }

        Self {
            url: raw.url.trim().to_string(),
            name: raw.name.trim().to_string(),
            description: raw.description.unwrap_or_default(),
            test_type: raw.test_type.unwrap_or_default().trim().to_string(),
            duration: raw.duration.as_ref().map(duration_minutes).unwrap_or(0),
            adaptive_support: raw.adaptive_support.as_ref().is_some_and(yes_flag),
            remote_support: raw.remote_support.as_ref().is_some_and(yes_flag),
            categories,
            full_text: raw.full_text.unwrap_or_default(),
        }
    }
}

fn duration_minutes(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u32))
            .unwrap_or(0),
        // Scraped values look like "30" or "Approximate Completion Time in minutes = 30".
        Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty())
            .and_then(|run| run.parse::<u32>().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

fn yes_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}

/// Balancer buckets derived from a record's test-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCategory {
    Knowledge,
    Personality,
    Other,
}

impl TestCategory {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "K" => TestCategory::Knowledge,
            "P" => TestCategory::Personality,
            _ => TestCategory::Other,
        }
    }
}

/// Structured reading of a hiring requirement. Every field is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequirement {
    pub skills: BTreeSet<String>,
    pub soft_skills: BTreeSet<String>,
    /// entry / mid / senior when known. Diagnostic only.
    pub experience_level: Option<String>,
    pub test_types_needed: BTreeSet<String>,
    /// Diagnostic only, never used for ranking.
    pub key_focus: String,
}

impl StructuredRequirement {
    pub fn needs(&self, label: &str) -> bool {
        self.test_types_needed.contains(label)
    }
}

/// A retrieval hit: a catalog position paired with its cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub similarity_score: f32,
}

/// A final pipeline result: the catalog record plus the similarity it was retrieved with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub record: AssessmentRecord,
    pub similarity_score: f32,
}
