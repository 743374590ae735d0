pub mod types;
pub mod corpus;
pub mod prompt;
pub mod parser;
pub mod ollama;
pub mod oracle;
pub mod diagnosis;
pub mod dedup;
pub mod severity;
pub mod classify;
pub mod report;
pub mod orchestrator;

pub use types::*;
pub use corpus::*;
pub use parser::*;
pub use ollama::*;
pub use oracle::*;
pub use diagnosis::*;
pub use dedup::*;
pub use severity::*;
pub use classify::*;
pub use report::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdverseEventError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to load reference corpus {path}: {reason}")]
    CorpusLoad { path: String, reason: String },

    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Extraction oracle unavailable after {attempts} attempt(s): {last_error}")]
    OracleUnavailable { attempts: u32, last_error: String },

    /// The oracle answered, but no parse strategy produced the expected shape.
    /// `raw` carries the untouched reply for manual review.
    #[error("Could not parse extraction response: {reason}")]
    ExtractionParse { reason: String, raw: String },
}

impl AdverseEventError {
    /// Transport-level failures worth another attempt against the oracle.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdverseEventError::OllamaConnection(_)
                | AdverseEventError::OllamaError { .. }
                | AdverseEventError::HttpClient(_)
        )
    }
}
