use super::types::{AuditRecordResponse, ErrorResponse, PredictionResponse};
use crate::{
    audit::AuditLog,
    metrics::{self, PredictionMetrics},
    predictor::Predictor,
    schema::{self, ValidationRules},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const PREDICTION_FAILED: &str = "Error during prediction.";

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub rules: ValidationRules,
    pub audit: Option<Arc<AuditLog>>,
    pub metrics: Option<PredictionMetrics>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, HandlerError> {
    let request_id = Uuid::new_v4();

    let payload = match payload {
        Ok(Json(Value::Object(map))) => map,
        Ok(Json(_)) => {
            warn!(%request_id, "Rejected prediction request: body is not a JSON object");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Request body must be a JSON object")),
            ));
        }
        Err(rejection) => {
            warn!(%request_id, "Rejected prediction request: {}", rejection.body_text());
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text())),
            ));
        }
    };

    let record = match schema::validate(&payload, state.rules) {
        Ok(record) => record,
        Err(errors) => {
            warn!(%request_id, "Validation error: {}", errors);
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: errors.to_string(),
                    details: errors.errors,
                }),
            ));
        }
    };

    let result = state.predictor.predict(&record).map_err(|e| {
        error!(%request_id, "Prediction failed: {}", e);
        internal_error(PREDICTION_FAILED)
    })?;

    if let Some(audit) = &state.audit {
        audit.record(&record, &result).await.map_err(|e| {
            error!(%request_id, "Failed to record prediction: {}", e);
            internal_error(PREDICTION_FAILED)
        })?;
    }

    if let Some(metrics) = &state.metrics {
        metrics.observe(&result);
    }

    info!(
        %request_id,
        predicted_churn = result.predicted_churn,
        churn_probability = result.churn_probability,
        "Prediction served"
    );
    Ok(Json(result.into()))
}

pub async fn model_predictions(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditRecordResponse>>, HandlerError> {
    let audit = state
        .audit
        .as_ref()
        .ok_or_else(|| internal_error("Audit log is disabled"))?;

    match audit.list().await {
        Ok(records) => Ok(Json(records.into_iter().map(Into::into).collect())),
        Err(e) => {
            error!("Failed to fetch predictions: {}", e);
            Err(internal_error("Failed to fetch predictions."))
        }
    }
}

pub async fn export_metrics(State(state): State<AppState>) -> Response {
    let rendered = match &state.metrics {
        Some(metrics) => metrics.render(),
        None => return internal_error("Metrics are disabled").into_response(),
    };

    match rendered {
        Ok(body) => ([(header::CONTENT_TYPE, metrics::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            internal_error("Failed to render metrics.").into_response()
        }
    }
}

fn internal_error(message: &str) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
}
