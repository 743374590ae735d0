//! Case-insensitive deduplication of oracle-proposed events.
//!
//! Oracle order is relevance order: the first occurrence of a term wins and
//! keeps its original casing, and only the first `MAX_EVENTS` survivors are kept.

use std::collections::HashSet;

use super::types::{CandidateEvent, ProposedEvent, MAX_EVENTS};

pub fn deduplicate(events: Vec<ProposedEvent>) -> Vec<CandidateEvent> {
    let mut seen: HashSet<String> = HashSet::new();

    events
        .into_iter()
        .filter(|event| {
            let key = event.term.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .take(MAX_EVENTS)
        .map(CandidateEvent::proposed)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::adverse_event::types::Severity;

    fn proposed(term: &str) -> ProposedEvent {
        ProposedEvent {
            term: term.into(),
            severity: None,
        }
    }

    fn terms(candidates: &[CandidateEvent]) -> Vec<&str> {
        candidates.iter().map(|c| c.term.as_str()).collect()
    }

    #[test]
    fn first_seen_casing_wins() {
        let result = deduplicate(vec![proposed("Nausea"), proposed("nausea "), proposed("NAUSEA")]);
        assert_eq!(terms(&result), vec!["Nausea"]);
    }

    #[test]
    fn first_seen_severity_wins() {
        let result = deduplicate(vec![
            ProposedEvent {
                term: "Seizure".into(),
                severity: Some(Severity::Hospitalization),
            },
            ProposedEvent {
                term: "seizure".into(),
                severity: Some(Severity::Fatal),
            },
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].provisional_severity, Some(Severity::Hospitalization));
        assert!(!result[0].is_diagnosis);
    }

    #[test]
    fn truncates_to_five_preserving_order() {
        let input = ["a", "b", "c", "d", "e", "f", "g"].map(proposed).to_vec();
        let result = deduplicate(input);
        assert_eq!(terms(&result), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn duplicates_do_not_consume_slots() {
        let input = ["a", "A", "b", "B", "c", "d", "e", "f"].map(proposed).to_vec();
        let result = deduplicate(input);
        assert_eq!(terms(&result), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn output_is_bounded_and_unique() {
        let input: Vec<ProposedEvent> = ["x", "Y", "x", "y", "Z", "w", "W", "v", "u", "t"]
            .map(proposed)
            .to_vec();
        let result = deduplicate(input.clone());
        assert!(result.len() <= MAX_EVENTS);
        assert!(result.len() <= input.len());

        let keys: HashSet<String> = result.iter().map(|c| c.term.to_lowercase()).collect();
        assert_eq!(keys.len(), result.len());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
