//! Layered parsing of untrusted oracle replies.
//!
//! The oracle may answer with clean JSON, JSON wrapped in markdown fences or
//! prose, or a loose literal (single quotes, `True`/`None`, trailing commas).
//! Strategies run in order until one yields a JSON value:
//! strict → object extraction → permissive literal.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::{ProposedEvent, Severity};
use super::AdverseEventError;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?").expect("Invalid code fence pattern"));

static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid object span pattern"));

type Strategy = fn(&str) -> Result<Value, String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("strict", parse_strict),
    ("object_extraction", parse_object_span),
    ("permissive_literal", parse_permissive_literal),
];

/// Parse an oracle reply into a JSON value, trying each strategy in turn.
pub fn parse_oracle_json(response: &str) -> Result<Value, AdverseEventError> {
    let cleaned = strip_code_fences(response);

    for (name, strategy) in STRATEGIES {
        match strategy(&cleaned) {
            Ok(value) => {
                tracing::debug!(strategy = name, "Oracle response parsed");
                return Ok(value);
            }
            Err(e) => tracing::warn!(strategy = name, error = %e, "Parse strategy failed"),
        }
    }

    Err(AdverseEventError::ExtractionParse {
        reason: "Could not parse JSON after trying multiple strategies".into(),
        raw: response.to_string(),
    })
}

/// Extract the `Diagnosed_Condition` string. Missing or null means no diagnosis.
pub fn parse_diagnosis_response(response: &str) -> Result<String, AdverseEventError> {
    let value = parse_oracle_json(response)?;
    let object = value.as_object().ok_or_else(|| AdverseEventError::ExtractionParse {
        reason: "Diagnosis response is not an object".into(),
        raw: response.to_string(),
    })?;

    Ok(object
        .get("Diagnosed_Condition")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

/// Extract the `Adverse_Events` list.
///
/// The envelope must be an object holding an array; entries inside it are
/// parsed leniently and skipped when they carry no usable term.
pub fn parse_events_response(response: &str) -> Result<Vec<ProposedEvent>, AdverseEventError> {
    let value = parse_oracle_json(response)?;
    let events = value
        .get("Adverse_Events")
        .and_then(Value::as_array)
        .ok_or_else(|| AdverseEventError::ExtractionParse {
            reason: "Invalid response format".into(),
            raw: response.to_string(),
        })?;

    Ok(events.iter().filter_map(parse_event_lenient).collect())
}

fn parse_event_lenient(item: &Value) -> Option<ProposedEvent> {
    let term = item.get("Term").and_then(Value::as_str)?.trim();
    if term.is_empty() {
        return None;
    }
    let severity = item
        .get("Severity")
        .and_then(Value::as_str)
        .and_then(Severity::from_oracle_label);

    Some(ProposedEvent {
        term: term.to_string(),
        severity,
    })
}

fn strip_code_fences(response: &str) -> String {
    CODE_FENCE.replace_all(response.trim(), "").trim().to_string()
}

fn parse_strict(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_object_span(text: &str) -> Result<Value, String> {
    let span = OBJECT_SPAN
        .find(text)
        .ok_or_else(|| "No JSON object found".to_string())?;
    serde_json::from_str(span.as_str()).map_err(|e| e.to_string())
}

fn parse_permissive_literal(text: &str) -> Result<Value, String> {
    let candidate = OBJECT_SPAN.find(text).map_or(text, |m| m.as_str());
    serde_json::from_str(&normalize_literal(candidate)).map_err(|e| e.to_string())
}

/// Rewrite a Python-style literal into JSON: single-quoted strings become
/// double-quoted, `True`/`False`/`None` become `true`/`false`/`null`, and
/// trailing commas before a closing bracket are dropped.
fn normalize_literal(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != c {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            // \' is not a JSON escape
                            if chars[i + 1] != '\'' {
                                out.push('\\');
                            }
                            out.push(chars[i + 1]);
                            i += 2;
                            continue;
                        }
                        '"' => out.push_str("\\\""),
                        '\n' => out.push_str("\\n"),
                        other => out.push(other),
                    }
                    i += 1;
                }
                out.push('"');
                i += 1;
            }
            ',' => {
                let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    other => out.push_str(other),
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses() {
        let events = parse_events_response(
            r#"{"Adverse_Events": [{"Term": "nausea", "Severity": "None of the above"}]}"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![ProposedEvent {
                term: "nausea".into(),
                severity: Some(Severity::None)
            }]
        );
    }

    #[test]
    fn markdown_fenced_json_parses() {
        let response = "```json\n{\"Adverse_Events\": [{\"Term\": \"rash\", \"Severity\": \"\"}]}\n```";
        let events = parse_events_response(response).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].term, "rash");
        assert_eq!(events[0].severity, None);
    }

    #[test]
    fn object_embedded_in_prose_parses() {
        let response = "Here is the extraction:\n{\"Diagnosed_Condition\": \"drug-induced hepatitis\"}\nLet me know if you need more.";
        assert_eq!(parse_diagnosis_response(response).unwrap(), "drug-induced hepatitis");
    }

    #[test]
    fn python_literal_parses() {
        let response = "{'Adverse_Events': [{'Term': 'seizure', 'Severity': 'Hospitalization'},],}";
        let events = parse_events_response(response).unwrap();
        assert_eq!(events[0].term, "seizure");
        assert_eq!(events[0].severity, Some(Severity::Hospitalization));
    }

    #[test]
    fn python_literal_keywords_are_translated() {
        let value = parse_oracle_json("{'a': True, 'b': False, 'c': None}").unwrap();
        assert_eq!(value, serde_json::json!({"a": true, "b": false, "c": null}));
    }

    #[test]
    fn literal_keeps_apostrophes_and_quotes_inside_strings() {
        let value = parse_oracle_json(r#"{'Term': "Crohn's disease", 'Note': 'said "ouch"'}"#).unwrap();
        assert_eq!(value["Term"], "Crohn's disease");
        assert_eq!(value["Note"], "said \"ouch\"");
    }

    #[test]
    fn prose_only_is_a_parse_error_with_raw_text() {
        let result = parse_events_response("I could not find any adverse events.");
        match result {
            Err(AdverseEventError::ExtractionParse { raw, .. }) => {
                assert_eq!(raw, "I could not find any adverse events.");
            }
            other => panic!("expected ExtractionParse, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_is_a_parse_error() {
        assert!(matches!(
            parse_events_response(""),
            Err(AdverseEventError::ExtractionParse { .. })
        ));
    }

    #[test]
    fn wrong_envelope_is_invalid_format() {
        let result = parse_events_response(r#"{"events": []}"#);
        match result {
            Err(AdverseEventError::ExtractionParse { reason, .. }) => {
                assert_eq!(reason, "Invalid response format");
            }
            other => panic!("expected ExtractionParse, got {other:?}"),
        }
    }

    #[test]
    fn empty_event_list_is_not_an_error() {
        let events = parse_events_response(r#"{"Adverse_Events": []}"#).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn entries_without_term_are_skipped() {
        let response = r#"{"Adverse_Events": [
            {"Term": "", "Severity": "Fatal or death"},
            {"Severity": "Life threatening"},
            {"Term": 42},
            {"Term": "  dizziness  ", "Severity": 7}
        ]}"#;
        let events = parse_events_response(response).unwrap();
        assert_eq!(
            events,
            vec![ProposedEvent {
                term: "dizziness".into(),
                severity: None
            }]
        );
    }

    #[test]
    fn missing_or_null_diagnosis_is_empty() {
        assert_eq!(parse_diagnosis_response("{}").unwrap(), "");
        assert_eq!(parse_diagnosis_response(r#"{"Diagnosed_Condition": null}"#).unwrap(), "");
        assert_eq!(parse_diagnosis_response(r#"{"Diagnosed_Condition": "  "}"#).unwrap(), "");
    }

    #[test]
    fn non_object_diagnosis_is_an_error() {
        assert!(parse_diagnosis_response("[1, 2]").is_err());
    }
}
