use super::record::RecordBuilder;
use super::{CustomerRecord, Field, FieldKind, FieldValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Reject any field whose value is below zero.
    pub non_negative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field that failed validation, in declared field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error{}",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "; {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks `payload` against the fixed customer schema.
///
/// Unknown keys are ignored. Either every field validates or the whole
/// payload is rejected.
pub fn validate(
    payload: &Map<String, Value>,
    rules: ValidationRules,
) -> Result<CustomerRecord, ValidationErrors> {
    let mut builder = RecordBuilder::default();
    let mut errors = Vec::new();

    for field in Field::ALL {
        match check_field(field, payload.get(field.name()), rules) {
            Ok(value) => builder.set(field, value),
            Err(message) => errors.push(FieldError {
                field: field.name().to_string(),
                message,
            }),
        }
    }

    if !errors.is_empty() {
        return Err(ValidationErrors { errors });
    }

    builder.build().ok_or_else(|| ValidationErrors {
        errors: vec![FieldError {
            field: "__root__".to_string(),
            message: "incomplete record".to_string(),
        }],
    })
}

fn check_field(
    field: Field,
    raw: Option<&Value>,
    rules: ValidationRules,
) -> Result<FieldValue, String> {
    let raw = match raw {
        None | Some(Value::Null) => return Err("field required".to_string()),
        Some(value) => value,
    };

    let value = match field.kind() {
        FieldKind::Integer => coerce_integer(raw).map(FieldValue::Integer),
        FieldKind::Float => coerce_float(raw).map(FieldValue::Float),
    }?;

    if rules.non_negative && value.as_f64() < 0.0 {
        return Err("value must be greater than or equal to 0".to_string());
    }

    Ok(value)
}

fn coerce_integer(raw: &Value) -> Result<i64, String> {
    const MESSAGE: &str = "value is not a valid integer";
    match raw {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(MESSAGE.to_string()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| MESSAGE.to_string()),
        _ => Err(MESSAGE.to_string()),
    }
}

fn coerce_float(raw: &Value) -> Result<f64, String> {
    const MESSAGE: &str = "value is not a valid float";
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(MESSAGE.to_string()),
    }
}
