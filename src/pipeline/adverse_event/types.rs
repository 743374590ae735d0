use serde::Serialize;

use super::AdverseEventError;

/// Maximum number of adverse events carried through to the report.
pub const MAX_EVENTS: usize = 5;

/// Regulatory severity categories, most to least severe.
///
/// `None` is the only non-serious value. The derived ordering follows
/// declaration order, so `Fatal < LifeThreatening < ... < None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    #[serde(rename = "Fatal or death")]
    Fatal,
    #[serde(rename = "Life threatening")]
    LifeThreatening,
    #[serde(rename = "Inpatient hospitalization or prolongation of hospitalization")]
    Hospitalization,
    #[serde(rename = "Congenital anomaly or birth defect")]
    CongenitalAnomaly,
    #[serde(rename = "Significant disability or incapacity")]
    SignificantDisability,
    #[serde(rename = "Medically significant")]
    MedicallySignificant,
    #[serde(rename = "None of the above")]
    None,
}

/// Labels the oracle uses when it has not decided on a severity.
const PLACEHOLDER_LABELS: &[&str] = &["", "to be determined"];

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Fatal,
        Severity::LifeThreatening,
        Severity::Hospitalization,
        Severity::CongenitalAnomaly,
        Severity::SignificantDisability,
        Severity::MedicallySignificant,
        Severity::None,
    ];

    /// Regulatory label as written in the output record.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal or death",
            Severity::LifeThreatening => "Life threatening",
            Severity::Hospitalization => {
                "Inpatient hospitalization or prolongation of hospitalization"
            }
            Severity::CongenitalAnomaly => "Congenital anomaly or birth defect",
            Severity::SignificantDisability => "Significant disability or incapacity",
            Severity::MedicallySignificant => "Medically significant",
            Severity::None => "None of the above",
        }
    }

    /// Map a severity string proposed by the oracle onto the enum.
    ///
    /// Accepts full labels and the short forms the prompt mentions, case-insensitively.
    /// Placeholders and unrecognised strings yield `None` (no provisional severity).
    pub fn from_oracle_label(raw: &str) -> Option<Severity> {
        let label = raw.trim().to_lowercase();
        if PLACEHOLDER_LABELS.contains(&label.as_str()) {
            return None;
        }

        let severity = match label.as_str() {
            "fatal or death" | "fatal" | "death" => Severity::Fatal,
            "life threatening" | "life-threatening" => Severity::LifeThreatening,
            "inpatient hospitalization or prolongation of hospitalization"
            | "inpatient hospitalization"
            | "hospitalization" => Severity::Hospitalization,
            "congenital anomaly or birth defect" | "congenital anomaly" => {
                Severity::CongenitalAnomaly
            }
            "significant disability or incapacity" | "significant disability" => {
                Severity::SignificantDisability
            }
            "medically significant" => Severity::MedicallySignificant,
            "none of the above" | "none" => Severity::None,
            _ => {
                tracing::warn!(label = raw, "Unrecognised oracle severity, ignoring");
                return None;
            }
        };
        Some(severity)
    }
}

/// Binary regulatory label derived from severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Seriousness {
    Serious,
    #[serde(rename = "Non-Serious")]
    NonSerious,
}

impl Seriousness {
    pub fn label(&self) -> &'static str {
        match self {
            Seriousness::Serious => "Serious",
            Seriousness::NonSerious => "Non-Serious",
        }
    }
}

/// A (term, severity) pair as proposed by the oracle's event extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedEvent {
    pub term: String,
    pub severity: Option<Severity>,
}

/// An adverse-event term awaiting severity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEvent {
    /// Verbatim text from the narrative, never rewritten after extraction.
    pub term: String,
    pub provisional_severity: Option<Severity>,
    pub is_diagnosis: bool,
}

impl CandidateEvent {
    pub fn diagnosis(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            provisional_severity: None,
            is_diagnosis: true,
        }
    }

    pub fn proposed(event: ProposedEvent) -> Self {
        Self {
            term: event.term,
            provisional_severity: event.severity,
            is_diagnosis: false,
        }
    }
}

/// Final record for one adverse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
    pub term: String,
    pub severity: Severity,
    pub seriousness: Seriousness,
    /// Name of the resolution rule that decided the severity (audit only).
    pub basis: &'static str,
}

/// Local LLM client abstraction (allows mocking).
pub trait LlmClient {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<String, AdverseEventError>;
}

impl<C: LlmClient + ?Sized> LlmClient for std::sync::Arc<C> {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<String, AdverseEventError> {
        (**self).generate(prompt, system, max_tokens)
    }
}

/// Untrusted generative extraction service.
pub trait ExtractionOracle {
    /// The single condition newly diagnosed after treatment began, or an empty string.
    fn propose_diagnosis(&self, text: &str) -> Result<String, AdverseEventError>;

    /// Adverse events quoted verbatim from the text, in relevance order.
    fn propose_events(&self, text: &str) -> Result<Vec<ProposedEvent>, AdverseEventError>;
}
