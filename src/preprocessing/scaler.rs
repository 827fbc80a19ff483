use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// A pre-fitted min-max scaler.
///
/// Values outside the fitted range extrapolate linearly; nothing is clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
            feature_names: None,
        };
        scaler.check()?;
        Ok(scaler)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading scaler artifact from: {}", path.display());

        let raw = tokio::fs::read_to_string(path).await?;
        let scaler: Self = serde_json::from_str(&raw)?;
        scaler.check()?;
        Ok(scaler)
    }

    fn check(&self) -> Result<()> {
        if self.data_min.len() != self.data_max.len() {
            return Err(Error::startup(format!(
                "scaler has {} minimums but {} maximums",
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        if self
            .data_min
            .iter()
            .chain(self.data_max.iter())
            .any(|v| !v.is_finite())
        {
            return Err(Error::startup("scaler bounds must be finite"));
        }
        let (lo, hi) = self.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::startup(format!(
                "invalid scaler feature range ({lo}, {hi})"
            )));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.data_min.len() {
                return Err(Error::startup(format!(
                    "scaler lists {} feature names for {} columns",
                    names.len(),
                    self.data_min.len()
                )));
            }
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.n_features() {
            return Err(Error::prediction(format!(
                "scaler expects {} columns, got {}",
                self.n_features(),
                values.len()
            )));
        }

        let (lo, hi) = self.feature_range;
        Ok(values
            .iter()
            .zip(self.data_min.iter().zip(self.data_max.iter()))
            .map(|(x, (min, max))| {
                let mut range = max - min;
                // Constant columns during fitting get a unit range.
                if range == 0.0 {
                    range = 1.0;
                }
                (x - min) / range * (hi - lo) + lo
            })
            .collect())
    }
}
