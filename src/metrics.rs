use crate::{Error, Result, predictor::PredictionResult};
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Prediction counters exposed on `/metrics`.
///
/// Owns its own registry rather than the process-global default one.
#[derive(Clone)]
pub struct PredictionMetrics {
    registry: Registry,
    predictions_total: IntCounter,
    last_probability: Gauge,
}

impl PredictionMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let predictions_total = IntCounter::new(
            "churn_predictions_total",
            "Total number of churn predictions served",
        )?;
        let last_probability = Gauge::new(
            "churn_last_probability",
            "Churn probability of the most recent prediction",
        )?;

        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(last_probability.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            last_probability,
        })
    }

    pub fn observe(&self, result: &PredictionResult) {
        self.predictions_total.inc();
        self.last_probability.set(result.churn_probability);
    }

    pub fn predictions_total(&self) -> u64 {
        self.predictions_total.get()
    }

    pub fn last_probability(&self) -> f64 {
        self.last_probability.get()
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::internal(format!("Failed to convert metrics to string: {e}")))
    }
}
