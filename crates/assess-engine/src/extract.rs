/// Requirement extraction: prompt construction, defensive parsing of the oracle's reply,
/// and the keyword fallback that needs no network.
use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::model::{
    StructuredRequirement, COGNITIVE, COMMUNICATION, KNOWLEDGE_AND_SKILLS,
    PERSONALITY_AND_BEHAVIOR,
};

pub const GENERAL_FOCUS: &str = "general assessment";

const SKILL_KEYWORDS: &[(&str, &str)] = &[
    ("java", "Java"),
    ("python", "Python"),
    ("javascript", "JavaScript"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("excel", "Excel"),
    ("selenium", "Selenium"),
];

const COMMUNICATION_WORDS: &[&str] = &["communication", "collaborate", "interpersonal"];
const LEADERSHIP_WORDS: &[&str] = &["leadership", "manager", "lead"];
const COGNITIVE_WORDS: &[&str] = &["cognitive", "reasoning", "analytical"];

const SENIOR_WORDS: &[&str] = &["senior", "principal", "director", "executive", "head of"];
const ENTRY_WORDS: &[&str] = &["entry level", "entry-level", "graduate", "junior", "intern"];
const MID_WORDS: &[&str] = &["mid level", "mid-level", "intermediate"];

pub fn build_extraction_prompt(query: &str) -> String {
    format!(
        "Analyze this job requirement or query and extract key information:\n\n\
Query: {query}\n\n\
Extract and return in JSON format:\n\
1. skills: List of technical skills mentioned (e.g., Java, Python, SQL)\n\
2. soft_skills: List of soft skills (e.g., communication, leadership)\n\
3. experience_level: entry/mid/senior level\n\
4. test_types_needed: List from [{KNOWLEDGE_AND_SKILLS}, {PERSONALITY_AND_BEHAVIOR}, {COGNITIVE}, {COMMUNICATION}]\n\
5. key_focus: Brief summary of what to prioritize\n\n\
Return ONLY valid JSON, no other text."
    )
}

/// Deterministic keyword extraction. Case-insensitive substring matching.
pub fn extract_keywords(query: &str) -> StructuredRequirement {
    let lowered = query.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    let skills: BTreeSet<String> = SKILL_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, label)| label.to_string())
        .collect();

    let mut soft_skills = BTreeSet::new();
    if mentions(COMMUNICATION_WORDS) {
        soft_skills.insert("Communication".to_string());
    }
    if mentions(LEADERSHIP_WORDS) {
        soft_skills.insert("Leadership".to_string());
    }

    let mut test_types_needed = BTreeSet::new();
    if !skills.is_empty() {
        test_types_needed.insert(KNOWLEDGE_AND_SKILLS.to_string());
    }
    if !soft_skills.is_empty() || lowered.contains("personality") {
        test_types_needed.insert(PERSONALITY_AND_BEHAVIOR.to_string());
    }
    if mentions(COGNITIVE_WORDS) {
        test_types_needed.insert(COGNITIVE.to_string());
    }

    let experience_level = if mentions(SENIOR_WORDS) {
        Some("senior".to_string())
    } else if mentions(ENTRY_WORDS) {
        Some("entry".to_string())
    } else if mentions(MID_WORDS) {
        Some("mid".to_string())
    } else {
        None
    };

    let key_focus = if skills.is_empty() && soft_skills.is_empty() {
        GENERAL_FOCUS.to_string()
    } else {
        skills
            .iter()
            .chain(soft_skills.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    StructuredRequirement {
        skills,
        soft_skills,
        experience_level,
        test_types_needed,
        key_focus,
    }
}

/// Locate the first well-formed JSON object embedded in free text.
///
/// Each `{` is tried in order as the start of an object; prose before and after the
/// object, and stray braces that do not open valid JSON, are skipped.
pub fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }
    }
    None
}

/// Parse an oracle reply into a requirement. `None` when no JSON object is present.
pub fn parse_requirement_response(text: &str) -> Option<StructuredRequirement> {
    let object = find_json_object(text)?;

    let test_types_needed = string_set(object.get("test_types_needed"))
        .into_iter()
        .map(|label| canonical_test_type(&label))
        .collect();

    let experience_level = object
        .get("experience_level")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let key_focus = object
        .get("key_focus")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| GENERAL_FOCUS.to_string());

    Some(StructuredRequirement {
        skills: string_set(object.get("skills")),
        soft_skills: string_set(object.get("soft_skills")),
        experience_level,
        test_types_needed,
        key_focus,
    })
}

/// Accept an array of strings or a single comma-separated string. Other shapes are empty.
fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn canonical_test_type(label: &str) -> String {
    let lowered = label.to_lowercase();
    if lowered.contains("knowledge") {
        KNOWLEDGE_AND_SKILLS.to_string()
    } else if lowered.contains("personality") || lowered.contains("behavio") {
        PERSONALITY_AND_BEHAVIOR.to_string()
    } else if lowered.contains("cognitive") {
        COGNITIVE.to_string()
    } else if lowered.contains("communication") {
        COMMUNICATION.to_string()
    } else if lowered.contains("skill") {
        KNOWLEDGE_AND_SKILLS.to_string()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keyword_path_detects_skills_and_soft_skills() {
        let req = extract_keywords("Java developer who also collaborates well with teams");
        assert_eq!(req.skills, set(&["Java"]));
        assert_eq!(req.soft_skills, set(&["Communication"]));
        assert_eq!(
            req.test_types_needed,
            set(&[KNOWLEDGE_AND_SKILLS, PERSONALITY_AND_BEHAVIOR])
        );
        assert_eq!(req.key_focus, "Java, Communication");
    }

    #[test]
    fn keyword_path_matches_substrings() {
        // "javascript" contains "java"; both labels are reported.
        let req = extract_keywords("JavaScript and SQL");
        assert_eq!(req.skills, set(&["Java", "JavaScript", "SQL"]));
    }

    #[test]
    fn keyword_path_cognitive_and_personality() {
        let req = extract_keywords("Need a personality and reasoning screen");
        assert!(req.skills.is_empty());
        assert_eq!(
            req.test_types_needed,
            set(&[PERSONALITY_AND_BEHAVIOR, COGNITIVE])
        );
        assert_eq!(req.key_focus, GENERAL_FOCUS);
    }

    #[test]
    fn keyword_path_with_nothing_detected_has_all_fields() {
        let req = extract_keywords("someone nice");
        assert!(req.skills.is_empty());
        assert!(req.soft_skills.is_empty());
        assert!(req.test_types_needed.is_empty());
        assert_eq!(req.key_focus, GENERAL_FOCUS);
        assert_eq!(req.experience_level, None);
    }

    #[test]
    fn keyword_path_infers_experience_level() {
        assert_eq!(
            extract_keywords("Senior Data Analyst").experience_level.as_deref(),
            Some("senior")
        );
        assert_eq!(
            extract_keywords("Entry level sales position for new graduates")
                .experience_level
                .as_deref(),
            Some("entry")
        );
    }

    #[test]
    fn parses_json_wrapped_in_prose_and_fences() {
        let reply = "Sure! Here you go:\n```json\n{\"skills\": [\"Python\", \"SQL\"], \
\"soft_skills\": [], \"experience_level\": \"Senior\", \
\"test_types_needed\": [\"knowledge & skills\", \"Cognitive\"], \
\"key_focus\": \"data skills\"}\n```\nLet me know {if} you need more.";
        let req = parse_requirement_response(reply).unwrap();
        assert_eq!(req.skills, set(&["Python", "SQL"]));
        assert!(req.soft_skills.is_empty());
        assert_eq!(req.experience_level.as_deref(), Some("senior"));
        assert_eq!(req.test_types_needed, set(&[KNOWLEDGE_AND_SKILLS, COGNITIVE]));
        assert_eq!(req.key_focus, "data skills");
    }

    #[test]
    fn skips_stray_braces_before_the_object() {
        let reply = "{not json} then {\"skills\": \"Java, Excel\"}";
        let req = parse_requirement_response(reply).unwrap();
        assert_eq!(req.skills, set(&["Excel", "Java"]));
        assert!(req.test_types_needed.is_empty());
        assert_eq!(req.key_focus, GENERAL_FOCUS);
    }

    #[test]
    fn missing_or_malformed_fields_become_empty() {
        let req = parse_requirement_response(r#"{"skills": 42, "test_types_needed": null}"#).unwrap();
        assert!(req.skills.is_empty());
        assert!(req.soft_skills.is_empty());
        assert!(req.test_types_needed.is_empty());
    }

    #[test]
    fn no_object_is_an_explicit_failure() {
        assert!(parse_requirement_response("I cannot help with that.").is_none());
        assert!(parse_requirement_response("{\"skills\": [\"Java\"").is_none());
        assert!(parse_requirement_response("[1, 2, 3]").is_none());
        assert!(parse_requirement_response("").is_none());
    }

    #[test]
    fn prompt_names_every_field() {
        let prompt = build_extraction_prompt("Java developer");
        for field in ["skills", "soft_skills", "experience_level", "test_types_needed", "key_focus"] {
            assert!(prompt.contains(field), "prompt should mention {field}");
        }
        assert!(prompt.contains("Query: Java developer"));
    }
}
