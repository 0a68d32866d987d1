/// Request coercion and response shaping at the service boundary.
use serde_json::Value;

use crate::error::RecommendError;
use crate::model::Recommendation;
use assess_common::api::RecommendedAssessment;

pub const DEFAULT_TOP_K: i64 = 10;
pub const MIN_TOP_K: usize = 1;
pub const MAX_TOP_K: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Clamp any requested count into `MIN_TOP_K..=MAX_TOP_K`.
pub fn clamp_top_k(requested: i64) -> usize {
    requested.clamp(MIN_TOP_K as i64, MAX_TOP_K as i64) as usize
}

/// Read a loosely-typed `top_k`: absent means the default; integers, floats (truncated)
/// and numeric strings are accepted; anything else is invalid input.
pub fn coerce_top_k(value: Option<&Value>) -> Result<i64, RecommendError> {
    let invalid = || RecommendError::InvalidInput("top_k must be an integer".to_string());
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_TOP_K),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

pub fn to_api(recommendation: &Recommendation) -> RecommendedAssessment {
    let record = &recommendation.record;
    RecommendedAssessment {
        url: record.url.clone(),
        name: record.name.clone(),
        adaptive_support: yes_no(record.adaptive_support),
        description: record.description.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        duration: record.duration,
        remote_support: yes_no(record.remote_support),
        test_type: if record.test_type.is_empty() {
            Vec::new()
        } else {
            vec![record.test_type.clone()]
        },
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}
