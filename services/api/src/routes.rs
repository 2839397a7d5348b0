use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use record_analytic::analytic::Record;
use record_analytic::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Either a single record or a batch of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EvaluateRequest {
    Batch(Vec<Record>),
    Single(Record),
}

/// Outcome of one record in a batch; a failing record does not fail its neighbours.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum BatchEntry {
    Evaluated(Record),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct ModelView {
    pub(crate) model_name: Option<String>,
    pub(crate) selected_index: usize,
    pub(crate) selected_model: Option<String>,
    pub(crate) target: String,
    pub(crate) location: Option<String>,
    pub(crate) models_in_document: usize,
    pub(crate) input_field_mapping: String,
    pub(crate) output_field_mapping: String,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/analytic/evaluate", post(evaluate_endpoint))
        .route("/api/v1/analytic/model", get(model_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn evaluate_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::Input(format!(
            "expected a record object or an array of record objects: {}",
            rejection.body_text()
        ))
    })?;

    match payload {
        EvaluateRequest::Single(record) => {
            let result = state.analytic.evaluate(&record)?;
            Ok(Json(result).into_response())
        }
        EvaluateRequest::Batch(records) => {
            let entries: Vec<BatchEntry> = records
                .iter()
                .enumerate()
                .map(|(index, record)| match state.analytic.evaluate(record) {
                    Ok(result) => BatchEntry::Evaluated(result),
                    Err(err) => {
                        warn!(index, error = %err, "record evaluation failed");
                        BatchEntry::Failed {
                            error: err.to_string(),
                        }
                    }
                })
                .collect();
            Ok(Json(entries).into_response())
        }
    }
}

pub(crate) async fn model_endpoint(Extension(state): Extension<AppState>) -> Json<ModelView> {
    let analytic = &state.analytic;
    let descriptor = analytic.selected_model();

    Json(ModelView {
        model_name: analytic.model_name().map(str::to_string),
        selected_index: analytic.selected_index(),
        selected_model: descriptor.name().map(str::to_string),
        target: descriptor.model.target.clone(),
        location: analytic.location().map(str::to_string),
        models_in_document: analytic.document().len(),
        input_field_mapping: analytic.input_spec().to_string(),
        output_field_mapping: analytic.output_spec().to_string(),
    })
}
