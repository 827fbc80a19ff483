use crate::{predictor::PredictionResult, schema::CustomerRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Option<i64>,
    pub input: CustomerRecord,
    pub result: PredictionResult,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(input: CustomerRecord, result: PredictionResult) -> Self {
        Self {
            id: None,
            input,
            result,
            timestamp: Utc::now(),
        }
    }
}
