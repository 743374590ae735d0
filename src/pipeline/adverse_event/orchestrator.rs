use std::sync::Arc;

use super::corpus::CorpusIndex;
use super::dedup::deduplicate;
use super::diagnosis::split_diagnosis;
use super::report::AdverseEventReport;
use super::severity::resolve_event;
use super::types::{CandidateEvent, ExtractionOracle, MAX_EVENTS};
use super::AdverseEventError;

/// Orchestrates one classification request:
/// validate → diagnosis-first extraction (or event extraction + dedup)
/// → severity resolution → seriousness → report.
///
/// Holds no per-request state; the corpus is shared read-only.
pub struct SeverityPipeline {
    oracle: Arc<dyn ExtractionOracle + Send + Sync>,
    corpus: Arc<CorpusIndex>,
}

impl SeverityPipeline {
    pub fn new(oracle: Arc<dyn ExtractionOracle + Send + Sync>, corpus: Arc<CorpusIndex>) -> Self {
        Self { oracle, corpus }
    }

    /// Classify a free-text narrative into ranked, severity-tagged events.
    ///
    /// Empty text is rejected before the oracle is consulted. Either the full
    /// report is produced or the request fails; there are no partial results.
    pub fn classify(&self, text: &str) -> Result<AdverseEventReport, AdverseEventError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdverseEventError::Validation(
                "No text provided for analysis".into(),
            ));
        }

        let candidates = self.extract_candidates(text)?;
        let resolved = candidates
            .into_iter()
            .take(MAX_EVENTS)
            .map(|candidate| resolve_event(candidate, &self.corpus))
            .collect();

        Ok(AdverseEventReport::new(resolved))
    }

    fn extract_candidates(&self, text: &str) -> Result<Vec<CandidateEvent>, AdverseEventError> {
        // The diagnosis path is an optimization; any failure falls through.
        match self.oracle.propose_diagnosis(text) {
            Ok(diagnosis) => {
                let candidates = split_diagnosis(&diagnosis);
                if !candidates.is_empty() {
                    tracing::info!(diagnosis = %diagnosis, count = candidates.len(), "Diagnosed condition found");
                    return Ok(candidates);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Diagnosis extraction failed, using event extraction");
            }
        }

        let proposed = self.oracle.propose_events(text)?;
        let candidates = deduplicate(proposed);
        tracing::info!(count = candidates.len(), "Adverse events extracted");
        Ok(candidates)
    }
}
