use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendParams {
    /// Free-text hiring requirement or job description.
    pub query: String,
    /// Number of assessments to return (default: 10, clamped to 1..=10). Integers,
    /// floats and numeric strings are accepted.
    pub top_k: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendedAssessment {
    pub url: String,
    pub name: String,
    /// "Yes" or "No".
    pub adaptive_support: String,
    /// At most 200 characters.
    pub description: String,
    /// Minutes, 0 when unknown.
    pub duration: u32,
    /// "Yes" or "No".
    pub remote_support: String,
    /// Single test-type code wrapped as a list, or empty.
    pub test_type: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<RecommendedAssessment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogInfoResponse {
    pub record_count: usize,
    /// "dense" or "sparse".
    pub index_mode: String,
    /// "oracle" or "heuristic".
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
}
