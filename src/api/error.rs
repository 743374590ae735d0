//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::adverse_event::AdverseEventError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Untouched oracle reply, kept for manual pharmacovigilance review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unparseable extraction response: {reason}")]
    ExtractionParse { reason: String, raw: String },
    #[error("Extraction service unavailable: {0}")]
    OracleUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, raw_response) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, None),
            ApiError::ExtractionParse { reason, raw } => {
                tracing::error!(%reason, %raw, "Extraction response could not be parsed");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_PARSE",
                    format!("Extraction response could not be parsed: {reason}"),
                    Some(raw),
                )
            }
            ApiError::OracleUnavailable(detail) => {
                tracing::error!(%detail, "Extraction service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ORACLE_UNAVAILABLE",
                    "Extraction service unavailable".to_string(),
                    None,
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                raw_response,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AdverseEventError> for ApiError {
    fn from(err: AdverseEventError) -> Self {
        match err {
            AdverseEventError::Validation(detail) => ApiError::BadRequest(detail),
            AdverseEventError::ExtractionParse { reason, raw } => {
                ApiError::ExtractionParse { reason, raw }
            }
            AdverseEventError::OracleUnavailable { .. }
            | AdverseEventError::OllamaConnection(_)
            | AdverseEventError::OllamaError { .. }
            | AdverseEventError::HttpClient(_) => ApiError::OracleUnavailable(err.to_string()),
            AdverseEventError::CorpusLoad { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("No text provided for analysis".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "No text provided for analysis");
        assert!(json["error"].get("raw_response").is_none());
    }

    #[tokio::test]
    async fn extraction_parse_returns_502_with_raw_text() {
        let response = ApiError::ExtractionParse {
            reason: "Invalid response format".into(),
            raw: "not json".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "EXTRACTION_PARSE");
        assert_eq!(json["error"]["raw_response"], "not json");
    }

    #[tokio::test]
    async fn oracle_unavailable_returns_503() {
        let response = ApiError::OracleUnavailable("down".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "ORACLE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn internal_returns_500() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        // Internal errors hide details from client
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn pipeline_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(AdverseEventError::Validation("empty".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AdverseEventError::OracleUnavailable {
                attempts: 3,
                last_error: "refused".into()
            }),
            ApiError::OracleUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(AdverseEventError::OllamaConnection("http://localhost:11434".into())),
            ApiError::OracleUnavailable(_)
        ));
        match ApiError::from(AdverseEventError::ExtractionParse {
            reason: "bad".into(),
            raw: "raw".into(),
        }) {
            ApiError::ExtractionParse { raw, .. } => assert_eq!(raw, "raw"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
