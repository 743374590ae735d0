use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::AdverseEventError;

/// Ollama HTTP client for the local extraction model.
///
/// Every `generate` call is retried up to `max_retries` attempts, without
/// backoff, before surfacing `OracleUnavailable`.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    max_retries: u32,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self, AdverseEventError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdverseEventError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
            max_retries: max_retries.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_once(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<String, AdverseEventError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            format: "json",
            options: GenerationOptions::deterministic(max_tokens),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AdverseEventError::OllamaConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    AdverseEventError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AdverseEventError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdverseEventError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AdverseEventError::HttpClient(format!("Undecodable response: {e}")))?;

        if parsed.response.trim().is_empty() {
            return Err(AdverseEventError::HttpClient("Empty response from model".into()));
        }
        Ok(parsed.response)
    }
}

/// Sampling options pinned for reproducible extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub seed: u64,
    pub num_predict: u32,
}

impl GenerationOptions {
    pub fn deterministic(num_predict: u32) -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.1,
            repeat_penalty: 1.0,
            seed: 42,
            num_predict,
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerationOptions,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

impl LlmClient for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<String, AdverseEventError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match self.generate_once(prompt, system, max_tokens) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Oracle call failed"
                    );
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(AdverseEventError::OracleUnavailable {
            attempts: self.max_retries,
            last_error,
        })
    }
}

/// One scripted reply from [`MockLlmClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Unavailable,
}

/// Mock LLM client for testing. Replays scripted replies and records prompts.
///
/// Once the script is exhausted every further call reports the oracle as unavailable.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    /// Reply with `response` to the first call.
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![MockReply::Text(response.to_string())])
    }

    pub fn scripted(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        prompt: &str,
        _system: &str,
        _max_tokens: u32,
    ) -> Result<String, AdverseEventError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Unavailable) | None => Err(AdverseEventError::OracleUnavailable {
                attempts: 1,
                last_error: "mock oracle unavailable".into(),
            }),
        }
    }
}
