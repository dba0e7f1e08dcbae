use crate::state::AppState;
use crate::telemetry;
use crate::{EMPTY_INPUT_WARNING, GENERIC_FAILURE_MESSAGE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use imdb_sentiment_core::{Error, Prediction, Sentiment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

// ============================================================================
// Health and model info
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn model_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.model_info.as_ref().clone())
}

// ============================================================================
// Prediction
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Review text; a missing field is treated as blank
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub label: Sentiment,
    pub confidence: f32,
    /// Confidence rounded to four decimals, as shown in the UI
    pub confidence_display: String,
    pub probabilities: [f32; 2],
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            label: prediction.label,
            confidence: prediction.confidence,
            confidence_display: prediction.confidence_display(),
            probabilities: prediction.probabilities,
        }
    }
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            telemetry::record_error("bad_request");
            tracing::debug!("Rejected predict body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    if req.text.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "warning": EMPTY_INPUT_WARNING })),
        )
            .into_response();
    }

    let classifier = Arc::clone(&state.classifier);
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || classifier.classify(&req.text)).await;

    match result {
        Ok(Ok(prediction)) => {
            telemetry::record_prediction(&prediction, start.elapsed());
            tracing::info!(
                label = %prediction.label,
                confidence = prediction.confidence,
                "Prediction served"
            );
            (StatusCode::OK, Json(PredictResponse::from(prediction))).into_response()
        }
        Ok(Err(err)) => prediction_error(err),
        Err(join_err) => {
            telemetry::record_error("panic");
            tracing::error!("Classifier task failed: {}", join_err);
            failure_response()
        }
    }
}

fn prediction_error(err: Error) -> Response {
    telemetry::record_error(err.kind());

    match err {
        Error::InputTooLong { .. } => {
            tracing::warn!("Rejected review: {}", err);
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
        other => {
            tracing::error!("Prediction failed: {}", other);
            failure_response()
        }
    }
}

fn failure_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": GENERIC_FAILURE_MESSAGE })),
    )
        .into_response()
}

// ============================================================================
// Metrics
// ============================================================================

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}
