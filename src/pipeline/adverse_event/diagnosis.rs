use super::types::CandidateEvent;

/// Split the oracle's diagnosis string into diagnosis-flagged candidates.
///
/// Fragments are comma-separated; blanks are dropped. An empty or
/// whitespace-only diagnosis yields no candidates.
pub fn split_diagnosis(diagnosis: &str) -> Vec<CandidateEvent> {
    diagnosis
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(CandidateEvent::diagnosis)
        .collect()
}
