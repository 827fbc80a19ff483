use super::{Classifier, sigmoid};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(Error::prediction(format!(
                "model expects {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        let margin = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        // Finite but extreme inputs can overflow the dot product.
        if !margin.is_finite() {
            return Err(Error::prediction(format!(
                "decision function overflowed to {} for the given input",
                margin
            )));
        }
        Ok(margin)
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.decision_function(features)?))
    }
}
