use super::AuditRecord;
use crate::{
    Error, Result,
    predictor::PredictionResult,
    schema::{CustomerRecord, Field, FieldKind, FieldValue, RecordBuilder},
};
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Builder, Connection, Database, Row, Value, params::Params};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Append-only log of served predictions backed by libSQL.
///
/// A single connection is shared behind a mutex so that `:memory:` databases
/// stay visible across calls and transactions never interleave.
pub struct AuditLog {
    _db: Database,
    conn: Mutex<Connection>,
}

impl AuditLog {
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;
        conn.execute(&create_table_sql(), ()).await?;

        info!("Audit database initialized successfully: {}", db_path);
        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
        })
    }

    /// Persists one prediction inside a transaction. On failure the
    /// transaction is rolled back and the error is returned to the caller.
    pub async fn record(
        &self,
        input: &CustomerRecord,
        result: &PredictionResult,
    ) -> Result<AuditRecord> {
        let mut record = AuditRecord::new(input.clone(), *result);

        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;
        let inserted = tx
            .execute(&insert_sql(), Params::Positional(insert_params(&record)))
            .await;

        match inserted {
            Ok(_) => {
                record.id = Some(tx.last_insert_rowid());
                tx.commit().await?;
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback after failed audit insert also failed: {}", rollback);
                }
                return Err(e.into());
            }
        }

        debug!("Prediction recorded with id {:?}", record.id);
        Ok(record)
    }

    /// Every stored record, newest first.
    pub async fn list(&self) -> Result<Vec<AuditRecord>> {
        let conn = self.conn.lock().await;
        let mut rows = conn.query(&select_sql(), ()).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }

        debug!("Retrieved {} audit records", records.len());
        Ok(records)
    }
}

fn column_list() -> String {
    Field::ALL
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql() -> String {
    let columns: Vec<String> = Field::ALL
        .iter()
        .map(|f| {
            let ty = match f.kind() {
                FieldKind::Integer => "INTEGER",
                FieldKind::Float => "REAL",
            };
            format!("{} {} NOT NULL", f.name(), ty)
        })
        .collect();

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {},
            predicted_churn INTEGER NOT NULL,
            churn_probability REAL NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
        columns.join(",\n            ")
    )
}

fn insert_sql() -> String {
    let placeholders = vec!["?"; Field::ALL.len() + 3].join(", ");
    format!(
        "INSERT INTO predictions ({}, predicted_churn, churn_probability, timestamp) VALUES ({})",
        column_list(),
        placeholders
    )
}

fn select_sql() -> String {
    format!(
        "SELECT id, {}, predicted_churn, churn_probability, timestamp FROM predictions ORDER BY timestamp DESC, id DESC",
        column_list()
    )
}

fn insert_params(record: &AuditRecord) -> Vec<Value> {
    let mut values: Vec<Value> = Field::ALL
        .iter()
        .map(|f| match record.input.value(*f) {
            FieldValue::Integer(v) => Value::Integer(v),
            FieldValue::Float(v) => Value::Real(v),
        })
        .collect();
    values.push(Value::Integer(i64::from(record.result.predicted_churn)));
    values.push(Value::Real(record.result.churn_probability));
    values.push(Value::Text(format_timestamp(&record.timestamp)));
    values
}

// Fixed-width so lexical order in SQL equals chronological order.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn record_from_row(row: &Row) -> Result<AuditRecord> {
    let mut builder = RecordBuilder::default();
    for (i, field) in Field::ALL.iter().enumerate() {
        let idx = (i + 1) as i32;
        let value = match field.kind() {
            FieldKind::Integer => FieldValue::Integer(row.get::<i64>(idx)?),
            FieldKind::Float => FieldValue::Float(row.get::<f64>(idx)?),
        };
        builder.set(*field, value);
    }
    let input = builder
        .build()
        .ok_or_else(|| Error::internal("Incomplete audit row"))?;

    let base = (Field::ALL.len() + 1) as i32;
    let predicted_churn: i64 = row.get(base)?;
    let churn_probability: f64 = row.get(base + 1)?;
    let timestamp_str: String = row.get(base + 2)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
        .with_timezone(&Utc);

    Ok(AuditRecord {
        id: Some(row.get(0)?),
        input,
        result: PredictionResult {
            predicted_churn: u8::try_from(predicted_churn)
                .map_err(|_| Error::internal(format!("Invalid stored label {predicted_churn}")))?,
            churn_probability,
        },
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ValidationRules, validate};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value as Json};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn customer(months: i64) -> CustomerRecord {
        let payload: Map<String, Json> = Field::ALL
            .iter()
            .map(|f| {
                let value = match f.kind() {
                    FieldKind::Integer => Json::from(1),
                    FieldKind::Float => Json::from(2.5),
                };
                (f.name().to_string(), value)
            })
            .collect();
        let mut record = validate(&payload, ValidationRules::default()).unwrap();
        record.months_in_service = months;
        record
    }

    fn result(p: f64) -> PredictionResult {
        PredictionResult {
            predicted_churn: u8::from(p > 0.5),
            churn_probability: p,
        }
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let log = AuditLog::new(":memory:").await.unwrap();

        let saved = log.record(&customer(12), &result(0.8)).await.unwrap();
        assert!(saved.id.is_some());

        let records = log.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], saved);
        assert_eq!(records[0].input.months_in_service, 12);
        assert_eq!(records[0].input.minutes_over_usage, 2.5);
        assert_eq!(records[0].result.predicted_churn, 1);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let log = AuditLog::new(":memory:").await.unwrap();

        for months in [1, 2, 3] {
            log.record(&customer(months), &result(0.1)).await.unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
        }

        let months: Vec<i64> = log
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.input.months_in_service)
            .collect();
        assert_eq!(months, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_empty_log() {
        let log = AuditLog::new(":memory:").await.unwrap();
        assert!(log.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("audit.db");
        let db_path = db_path.to_string_lossy().to_string();

        {
            let log = AuditLog::new(&db_path).await.unwrap();
            log.record(&customer(7), &result(0.3)).await.unwrap();
        }

        let reopened = AuditLog::new(&db_path).await.unwrap();
        let records = reopened.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].input.months_in_service, 7);
        assert_eq!(records[0].result.churn_probability, 0.3);
    }

    #[tokio::test]
    async fn test_invalid_path_fails() {
        assert!(AuditLog::new("/invalid/path/to/audit.db").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_writes() {
        let log = Arc::new(AuditLog::new(":memory:").await.unwrap());

        let mut handles = vec![];
        for i in 0..10 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                log.record(&customer(i), &result(0.5)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = log.list().await.unwrap();
        assert_eq!(records.len(), 10);
        let mut ids: Vec<i64> = records.iter().filter_map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
