//! Fixed-precedence severity resolution.
//!
//! The precedence is an ordered table of `(condition, outcome)` rules,
//! evaluated top to bottom; the first rule that applies decides. Corpus
//! evidence comes first for every candidate. Diagnosis candidates then get
//! keyword escalation and a second corpus pass; other candidates fall back to
//! the oracle's provisional severity. Anything left over is `None`.

use super::classify::seriousness;
use super::corpus::{CorpusIndex, CorpusTier};
use super::types::{CandidateEvent, ResolvedEvent, Severity};

pub const FATAL_KEYWORDS: &[&str] = &[
    "died",
    "passed away",
    "death",
    "deceased",
    "expired",
    "mortality",
];

pub const LIFE_THREATENING_KEYWORDS: &[&str] = &[
    "life-threatening",
    "ventilator",
    "emergency intervention",
    "critical condition",
    "near death",
    "almost died",
    "intensive care",
];

pub const HOSPITALIZATION_KEYWORDS: &[&str] = &[
    "hospitalization",
    "hospital",
    "admitted",
    "admission",
    "emergency room",
    "er visit",
];

/// Name recorded when no rule applies.
pub const DEFAULT_BASIS: &str = "default_none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCondition {
    /// Any candidate whose term matches the tier.
    CorpusTier(CorpusTier),
    /// Diagnosis candidates whose term contains one of the keywords.
    DiagnosisKeyword(&'static [&'static str]),
    /// Diagnosis candidates whose term matches the tier.
    DiagnosisCorpusTier(CorpusTier),
    /// Non-diagnosis candidates.
    OracleProposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Fixed(Severity),
    /// The candidate's provisional severity, when it has one.
    Provisional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityRule {
    pub name: &'static str,
    pub condition: RuleCondition,
    pub outcome: RuleOutcome,
}

const fn rule(name: &'static str, condition: RuleCondition, severity: Severity) -> SeverityRule {
    SeverityRule {
        name,
        condition,
        outcome: RuleOutcome::Fixed(severity),
    }
}

pub static SEVERITY_RULES: [SeverityRule; 10] = [
    rule(
        "corpus_significant_disability",
        RuleCondition::CorpusTier(CorpusTier::SignificantDisability),
        Severity::SignificantDisability,
    ),
    rule(
        "corpus_congenital_anomaly",
        RuleCondition::CorpusTier(CorpusTier::CongenitalAnomaly),
        Severity::CongenitalAnomaly,
    ),
    rule(
        "corpus_medically_significant",
        RuleCondition::CorpusTier(CorpusTier::MedicallySignificant),
        Severity::MedicallySignificant,
    ),
    rule(
        "diagnosis_fatal_keyword",
        RuleCondition::DiagnosisKeyword(FATAL_KEYWORDS),
        Severity::Fatal,
    ),
    rule(
        "diagnosis_life_threatening_keyword",
        RuleCondition::DiagnosisKeyword(LIFE_THREATENING_KEYWORDS),
        Severity::LifeThreatening,
    ),
    rule(
        "diagnosis_hospitalization_keyword",
        RuleCondition::DiagnosisKeyword(HOSPITALIZATION_KEYWORDS),
        Severity::Hospitalization,
    ),
    rule(
        "diagnosis_corpus_significant_disability",
        RuleCondition::DiagnosisCorpusTier(CorpusTier::SignificantDisability),
        Severity::SignificantDisability,
    ),
    rule(
        "diagnosis_corpus_congenital_anomaly",
        RuleCondition::DiagnosisCorpusTier(CorpusTier::CongenitalAnomaly),
        Severity::CongenitalAnomaly,
    ),
    rule(
        "diagnosis_corpus_medically_significant",
        RuleCondition::DiagnosisCorpusTier(CorpusTier::MedicallySignificant),
        Severity::MedicallySignificant,
    ),
    SeverityRule {
        name: "oracle_provisional",
        condition: RuleCondition::OracleProposed,
        outcome: RuleOutcome::Provisional,
    },
];

impl SeverityRule {
    /// Severity this rule assigns to the candidate, or `None` if it does not apply.
    pub fn apply(&self, candidate: &CandidateEvent, corpus: &CorpusIndex) -> Option<Severity> {
        let applies = match self.condition {
            RuleCondition::CorpusTier(tier) => corpus.matches(&candidate.term, tier),
            RuleCondition::DiagnosisKeyword(keywords) => {
                candidate.is_diagnosis && contains_any(&candidate.term, keywords)
            }
            RuleCondition::DiagnosisCorpusTier(tier) => {
                candidate.is_diagnosis && corpus.matches(&candidate.term, tier)
            }
            RuleCondition::OracleProposed => !candidate.is_diagnosis,
        };
        if !applies {
            return None;
        }

        match self.outcome {
            RuleOutcome::Fixed(severity) => Some(severity),
            RuleOutcome::Provisional => candidate.provisional_severity,
        }
    }
}

/// Resolve the final severity and the name of the rule that decided it.
pub fn resolve_severity(candidate: &CandidateEvent, corpus: &CorpusIndex) -> (Severity, &'static str) {
    SEVERITY_RULES
        .iter()
        .find_map(|rule| rule.apply(candidate, corpus).map(|severity| (severity, rule.name)))
        .unwrap_or((Severity::None, DEFAULT_BASIS))
}

/// Resolve severity and derive seriousness. The term is carried through untouched.
pub fn resolve_event(candidate: CandidateEvent, corpus: &CorpusIndex) -> ResolvedEvent {
    let (severity, basis) = resolve_severity(&candidate, corpus);
    tracing::debug!(
        term = %candidate.term,
        is_diagnosis = candidate.is_diagnosis,
        severity = severity.label(),
        basis,
        "Severity resolved"
    );

    ResolvedEvent {
        term: candidate.term,
        severity,
        seriousness: seriousness(severity),
        basis,
    }
}

fn contains_any(term: &str, keywords: &[&str]) -> bool {
    let lowered = term.trim().to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> CorpusIndex {
        CorpusIndex::from_terms(
            &["paralysis", "blindness"],
            &["cleft palate", "spina bifida"],
            &["hepatitis", "palate", "seizure", "anaphylaxis"],
        )
    }

    fn event(term: &str, severity: Option<Severity>) -> CandidateEvent {
        CandidateEvent {
            term: term.into(),
            provisional_severity: severity,
            is_diagnosis: false,
        }
    }

    #[test]
    fn significant_disability_overrides_oracle_severity() {
        let corpus = corpus();
        for provisional in Severity::ALL.into_iter().map(Some).chain([None]) {
            let candidate = event("Complete Paralysis of the legs", provisional);
            assert_eq!(
                resolve_severity(&candidate, &corpus),
                (Severity::SignificantDisability, "corpus_significant_disability")
            );
        }
    }

    #[test]
    fn significant_disability_overrides_diagnosis_keywords() {
        let candidate = CandidateEvent::diagnosis("paralysis leading to death");
        assert_eq!(resolve_severity(&candidate, &corpus()).0, Severity::SignificantDisability);
    }

    #[test]
    fn congenital_anomaly_beats_medically_significant() {
        let (severity, basis) = resolve_severity(&event("cleft palate", None), &corpus());
        assert_eq!(severity, Severity::CongenitalAnomaly);
        assert_eq!(basis, "corpus_congenital_anomaly");
    }

    #[test]
    fn medically_significant_via_substring() {
        let candidate = CandidateEvent::diagnosis("drug-induced hepatitis");
        assert_eq!(
            resolve_severity(&candidate, &corpus()),
            (Severity::MedicallySignificant, "corpus_medically_significant")
        );
    }

    #[test]
    fn diagnosis_keyword_order() {
        let corpus = corpus();
        let cases = [
            ("cardiac arrest, patient died", Severity::Fatal),
            ("respiratory failure requiring ventilator", Severity::LifeThreatening),
            ("critical condition in hospital", Severity::LifeThreatening),
            // "near death" also contains a fatal keyword, which is checked first
            ("near death", Severity::Fatal),
            ("admitted with arrhythmia", Severity::Hospitalization),
            ("ER visit for chest pain", Severity::Hospitalization),
            ("death after hospital admission", Severity::Fatal),
        ];
        for (term, expected) in cases {
            let candidate = CandidateEvent::diagnosis(term);
            assert_eq!(resolve_severity(&candidate, &corpus).0, expected, "term: {term}");
        }
    }

    #[test]
    fn every_keyword_escalates_a_diagnosis() {
        let corpus = corpus();
        let lists = [
            (FATAL_KEYWORDS, Severity::Fatal),
            (LIFE_THREATENING_KEYWORDS, Severity::LifeThreatening),
            (HOSPITALIZATION_KEYWORDS, Severity::Hospitalization),
        ];
        for (keywords, expected) in lists {
            for keyword in keywords {
                // "near death" and "almost died" carry fatal keywords, checked first
                if expected == Severity::LifeThreatening && contains_any(keyword, FATAL_KEYWORDS) {
                    continue;
                }
                let candidate = CandidateEvent::diagnosis(format!("Rash with {}", keyword.to_uppercase()));
                assert_eq!(
                    resolve_severity(&candidate, &corpus).0,
                    expected,
                    "keyword: {keyword}"
                );
            }
        }
    }

    #[test]
    fn named_keywords_escalate() {
        let corpus = corpus();
        let cases = [
            ("increased mortality", Severity::Fatal),
            ("patient passed away", Severity::Fatal),
            ("deceased at follow-up", Severity::Fatal),
            ("expired overnight", Severity::Fatal),
            ("transfer to intensive care", Severity::LifeThreatening),
            ("emergency room visit", Severity::Hospitalization),
            ("prolonged hospitalization", Severity::Hospitalization),
        ];
        for (term, expected) in cases {
            let candidate = CandidateEvent::diagnosis(term);
            assert_eq!(resolve_severity(&candidate, &corpus).0, expected, "term: {term}");
        }
    }

    #[test]
    fn keywords_match_as_raw_substrings() {
        // "fever visit" contains "er visit"; matching is substring-based, not word-based.
        let candidate = CandidateEvent::diagnosis("fever visit");
        assert_eq!(
            resolve_severity(&candidate, &corpus()),
            (Severity::Hospitalization, "diagnosis_hospitalization_keyword")
        );
    }

    #[test]
    fn diagnosis_without_evidence_is_none() {
        let corpus = corpus();
        for term in ["drug-induced rash", "acute kidney injury"] {
            let candidate = CandidateEvent::diagnosis(term);
            assert_eq!(
                resolve_severity(&candidate, &corpus),
                (Severity::None, DEFAULT_BASIS)
            );
        }
    }

    #[test]
    fn non_diagnosis_terms_skip_keyword_escalation() {
        let candidate = event("patient died", None);
        assert_eq!(resolve_severity(&candidate, &corpus()).0, Severity::None);
    }

    #[test]
    fn non_diagnosis_uses_oracle_severity() {
        let candidate = event("cardiac arrest", Some(Severity::LifeThreatening));
        assert_eq!(
            resolve_severity(&candidate, &corpus()),
            (Severity::LifeThreatening, "oracle_provisional")
        );
    }

    #[test]
    fn non_diagnosis_without_oracle_severity_is_none() {
        let candidate = event("cardiac arrest", None);
        assert_eq!(
            resolve_severity(&candidate, &corpus()),
            (Severity::None, DEFAULT_BASIS)
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let corpus = corpus();
        let candidate = CandidateEvent::diagnosis("seizure requiring intensive care");
        let first = resolve_severity(&candidate, &corpus);
        for _ in 0..10 {
            assert_eq!(resolve_severity(&candidate, &corpus), first);
        }
        assert_eq!(first.0, Severity::MedicallySignificant);
    }

    #[test]
    fn rule_table_starts_with_corpus_tiers_in_precedence_order() {
        let tiers: Vec<CorpusTier> = SEVERITY_RULES
            .iter()
            .take(3)
            .map(|rule| match rule.condition {
                RuleCondition::CorpusTier(tier) => tier,
                other => panic!("unexpected leading rule {other:?}"),
            })
            .collect();
        assert_eq!(tiers, CorpusTier::PRECEDENCE.to_vec());
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<&str> = SEVERITY_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SEVERITY_RULES.len());
    }

    #[test]
    fn resolve_event_keeps_term_and_derives_seriousness() {
        let resolved = resolve_event(event("Anaphylaxis", None), &corpus());
        assert_eq!(resolved.term, "Anaphylaxis");
        assert_eq!(resolved.severity, Severity::MedicallySignificant);
        assert_eq!(resolved.seriousness, crate::pipeline::adverse_event::Seriousness::Serious);
    }
}
