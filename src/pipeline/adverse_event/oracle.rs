use super::parser::{parse_diagnosis_response, parse_events_response};
use super::prompt::{
    build_diagnosis_prompt, build_events_prompt, DIAGNOSIS_MAX_TOKENS, EVENTS_MAX_TOKENS,
    EXTRACTION_SYSTEM_PROMPT,
};
use super::types::{ExtractionOracle, LlmClient, ProposedEvent};
use super::AdverseEventError;

/// [`ExtractionOracle`] backed by a local LLM.
pub struct LlmExtractionOracle<C> {
    llm: C,
}

impl<C: LlmClient> LlmExtractionOracle<C> {
    pub fn new(llm: C) -> Self {
        Self { llm }
    }
}

impl<C: LlmClient> ExtractionOracle for LlmExtractionOracle<C> {
    fn propose_diagnosis(&self, text: &str) -> Result<String, AdverseEventError> {
        let prompt = build_diagnosis_prompt(text);
        let response = self
            .llm
            .generate(&prompt, EXTRACTION_SYSTEM_PROMPT, DIAGNOSIS_MAX_TOKENS)?;
        parse_diagnosis_response(&response)
    }

    fn propose_events(&self, text: &str) -> Result<Vec<ProposedEvent>, AdverseEventError> {
        let prompt = build_events_prompt(text);
        let response = self
            .llm
            .generate(&prompt, EXTRACTION_SYSTEM_PROMPT, EVENTS_MAX_TOKENS)?;
        parse_events_response(&response)
    }
}
