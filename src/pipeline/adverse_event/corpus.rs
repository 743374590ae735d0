//! Reference term corpora for the three corpus-backed severity tiers.
//!
//! Each tier is a set of lowercase, trimmed canonical phrases read from a
//! one-term-per-line delimited file. The index is built once at startup and
//! shared read-only across requests.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::types::Severity;
use super::AdverseEventError;

/// Severity tiers backed by curated reference lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorpusTier {
    SignificantDisability,
    CongenitalAnomaly,
    MedicallySignificant,
}

impl CorpusTier {
    /// Fixed evaluation order. Earlier tiers win when a term matches several.
    pub const PRECEDENCE: [CorpusTier; 3] = [
        CorpusTier::SignificantDisability,
        CorpusTier::CongenitalAnomaly,
        CorpusTier::MedicallySignificant,
    ];

    pub fn severity(&self) -> Severity {
        match self {
            CorpusTier::SignificantDisability => Severity::SignificantDisability,
            CorpusTier::CongenitalAnomaly => Severity::CongenitalAnomaly,
            CorpusTier::MedicallySignificant => Severity::MedicallySignificant,
        }
    }

    /// File name of the tier's reference list inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            CorpusTier::SignificantDisability => "Significant disability.csv",
            CorpusTier::CongenitalAnomaly => "Congenital Anomaly.csv",
            CorpusTier::MedicallySignificant => "Medically significant.csv",
        }
    }
}

/// Locations of the three tier files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    pub significant_disability: PathBuf,
    pub congenital_anomaly: PathBuf,
    pub medically_significant: PathBuf,
}

impl CorpusPaths {
    /// Standard file names under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            significant_disability: dir.join(CorpusTier::SignificantDisability.file_name()),
            congenital_anomaly: dir.join(CorpusTier::CongenitalAnomaly.file_name()),
            medically_significant: dir.join(CorpusTier::MedicallySignificant.file_name()),
        }
    }

    pub fn path(&self, tier: CorpusTier) -> &Path {
        match tier {
            CorpusTier::SignificantDisability => &self.significant_disability,
            CorpusTier::CongenitalAnomaly => &self.congenital_anomaly,
            CorpusTier::MedicallySignificant => &self.medically_significant,
        }
    }
}

/// Immutable, case-normalized reference terms for every tier.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    significant_disability: BTreeSet<String>,
    congenital_anomaly: BTreeSet<String>,
    medically_significant: BTreeSet<String>,
}

impl CorpusIndex {
    /// Load all three tiers.
    ///
    /// A missing file degrades to an empty tier. A file that exists but cannot
    /// be read or parsed is an error, as is the absence of every tier.
    pub fn load(paths: &CorpusPaths) -> Result<Self, AdverseEventError> {
        let mut index = CorpusIndex::default();
        let mut missing = 0;

        for tier in CorpusTier::PRECEDENCE {
            let path = paths.path(tier);
            match load_tier(path)? {
                Some(terms) => {
                    tracing::info!(?tier, path = %path.display(), terms = terms.len(), "Loaded corpus tier");
                    *index.tier_mut(tier) = terms;
                }
                None => {
                    tracing::warn!(?tier, path = %path.display(), "Corpus file not found, tier left empty");
                    missing += 1;
                }
            }
        }

        if missing == CorpusTier::PRECEDENCE.len() {
            return Err(AdverseEventError::CorpusLoad {
                path: paths.medically_significant.parent().unwrap_or(Path::new(".")).display().to_string(),
                reason: "no corpus tier files found".into(),
            });
        }

        Ok(index)
    }

    /// Build an index from in-memory term lists (normalized the same way as files).
    pub fn from_terms(
        significant_disability: &[&str],
        congenital_anomaly: &[&str],
        medically_significant: &[&str],
    ) -> Self {
        Self {
            significant_disability: normalize_all(significant_disability),
            congenital_anomaly: normalize_all(congenital_anomaly),
            medically_significant: normalize_all(medically_significant),
        }
    }

    /// True when any entry of `tier` is a substring of the lowercased term.
    pub fn matches(&self, term: &str, tier: CorpusTier) -> bool {
        let lowered = term.trim().to_lowercase();
        self.tier(tier)
            .iter()
            .any(|entry| lowered.contains(entry.as_str()))
    }

    pub fn tier_len(&self, tier: CorpusTier) -> usize {
        self.tier(tier).len()
    }

    pub fn is_empty(&self) -> bool {
        CorpusTier::PRECEDENCE
            .iter()
            .all(|tier| self.tier(*tier).is_empty())
    }

    fn tier(&self, tier: CorpusTier) -> &BTreeSet<String> {
        match tier {
            CorpusTier::SignificantDisability => &self.significant_disability,
            CorpusTier::CongenitalAnomaly => &self.congenital_anomaly,
            CorpusTier::MedicallySignificant => &self.medically_significant,
        }
    }

    fn tier_mut(&mut self, tier: CorpusTier) -> &mut BTreeSet<String> {
        match tier {
            CorpusTier::SignificantDisability => &mut self.significant_disability,
            CorpusTier::CongenitalAnomaly => &mut self.congenital_anomaly,
            CorpusTier::MedicallySignificant => &mut self.medically_significant,
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn load_tier(path: &Path) -> Result<Option<BTreeSet<String>>, AdverseEventError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AdverseEventError::CorpusLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    read_terms(file).map(Some).map_err(|e| AdverseEventError::CorpusLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Read the first column of every row. No header row; rows may vary in width.
fn read_terms<R: Read>(reader: R) -> Result<BTreeSet<String>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut terms = BTreeSet::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(term) = record.get(0).and_then(normalize_term) {
            terms.insert(term);
        }
    }
    Ok(terms)
}

/// Blank entries are dropped: an empty string is a substring of every term.
fn normalize_term(raw: &str) -> Option<String> {
    let term = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    (!term.is_empty()).then_some(term)
}

fn normalize_all(terms: &[&str]) -> BTreeSet<String> {
    terms.iter().filter_map(|t| normalize_term(t)).collect()
}
