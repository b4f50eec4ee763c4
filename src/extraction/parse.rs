// src/extraction/parse.rs

//! Turns the model's free-form reply into a [`RawKey`].
//!
//! The model is asked for bare JSON but does not always comply, so the text
//! goes through a chain of increasingly lenient strategies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::GradingError;
use crate::grading::RawKey;

type Strategy = fn(&str) -> Option<RawKey>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("strict", strict_json),
    ("fenced", fenced_json),
    ("pattern", pattern_pairs),
];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").unwrap());

static ANSWER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\d+)"\s*:\s*"([ABCD])""#).unwrap());

/// Runs the strategies in order and returns the first key produced.
pub fn parse_model_response(text: &str) -> Result<RawKey, GradingError> {
    for (name, strategy) in STRATEGIES {
        match strategy(text) {
            Some(raw) => {
                tracing::debug!("Model response parsed by {} strategy ({} entries)", name, raw.len());
                return Ok(raw);
            }
            None => tracing::warn!("Model response rejected by {} strategy", name),
        }
    }

    Err(GradingError::ExtractionFailure(
        "response was not valid JSON and pattern fallback extracted nothing".to_string(),
    ))
}

/// The whole reply is a JSON object. An empty object counts: the model may
/// legitimately find nothing.
fn strict_json(text: &str) -> Option<RawKey> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(RawKey::from(map)),
        _ => None,
    }
}

/// A JSON object wrapped in a Markdown code fence.
fn fenced_json(text: &str) -> Option<RawKey> {
    CODE_FENCE
        .captures_iter(text)
        .find_map(|caps| strict_json(&caps[1]))
}

/// Every `"<digits>": "<A-D>"` pair anywhere in the text.
fn pattern_pairs(text: &str) -> Option<RawKey> {
    let raw: RawKey = ANSWER_PAIR
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), Value::String(caps[2].to_string())))
        .collect();

    (!raw.is_empty()).then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json() {
        let raw = parse_model_response(r#" {"101": "B", "102": "D"} "#).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get("101"), Some(&Value::String("B".to_string())));
    }

    #[test]
    fn test_strict_empty_object() {
        let raw = parse_model_response("{}").unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here is the key:\n```json\n{\"1\": \"A\", \"2\": \"C\"}\n```\nGood luck!";
        let raw = parse_model_response(text).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get("2"), Some(&Value::String("C".to_string())));
    }

    #[test]
    fn test_pattern_fallback_on_broken_json() {
        let text = r#"{"1": "A", "2" : "B", "3": "E", "4": "D", ...}"#;
        let raw = parse_model_response(text).unwrap();

        assert_eq!(raw.len(), 3);
        assert!(raw.get("3").is_none());
        assert_eq!(raw.get("4"), Some(&Value::String("D".to_string())));
    }

    #[test]
    fn test_array_reply_falls_through() {
        // Not an object, and no quoted pairs to salvage.
        let err = parse_model_response(r#"["A", "B"]"#).unwrap_err();
        assert!(matches!(err, GradingError::ExtractionFailure(_)));
    }

    #[test]
    fn test_prose_reply_fails() {
        let err = parse_model_response("I could not read the image, sorry.").unwrap_err();
        assert!(matches!(err, GradingError::ExtractionFailure(_)));
    }
}
