use crate::{
    audit::AuditRecord,
    predictor::PredictionResult,
    schema::{CustomerRecord, FieldError},
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_churn: u8,
    pub churn_probability: f64,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            predicted_churn: result.predicted_churn,
            churn_probability: result.churn_probability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecordResponse {
    pub id: Option<i64>,
    pub timestamp: String,
    pub predicted_churn: u8,
    pub churn_probability: f64,
    pub input_data: CustomerRecord,
}

impl From<AuditRecord> for AuditRecordResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            predicted_churn: record.result.predicted_churn,
            churn_probability: record.result.churn_probability,
            input_data: record.input,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Vec::new(),
        }
    }
}
