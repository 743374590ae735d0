//! Narrative analysis endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeRequest, ApiContext, RequestId};
use crate::pipeline::adverse_event::AdverseEventReport;

/// `POST /analyze`: extract and grade adverse events from `{"text": ...}`.
///
/// The pipeline makes blocking oracle calls, so it runs on the blocking pool.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AdverseEventReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::BadRequest("Request must be JSON".into())
        }
        other => ApiError::BadRequest(other.body_text()),
    })?;

    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No text provided for analysis".into()));
    }

    let span = tracing::info_span!("analyze", %request_id, chars = request.text.len());
    let pipeline = ctx.pipeline.clone();

    let report = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        pipeline.classify(&request.text)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))??;

    tracing::info!(%request_id, events = report.events().len(), "Analysis complete");
    Ok(Json(report))
}
