//! Shared types for the API layer.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::pipeline::adverse_event::SeverityPipeline;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<SeverityPipeline>,
}

impl ApiContext {
    pub fn new(pipeline: Arc<SeverityPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Per-request identifier, injected into request extensions by the audit middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}
