use super::{Classifier, GradientBoostedTrees, LogisticRegression};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression(LogisticRegression),
    GradientBoostedTrees(GradientBoostedTrees),
}

/// Serialized classifier as produced by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Column names in fitted order, when the exporter recorded them.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub model: ModelKind,
}

impl ModelArtifact {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading model artifact from: {}", path.display());

        let raw = tokio::fs::read_to_string(path).await?;
        let artifact: Self = serde_json::from_str(&raw)?;
        Ok(artifact)
    }

    pub fn n_features(&self) -> usize {
        match &self.model {
            ModelKind::LogisticRegression(m) => m.n_features(),
            ModelKind::GradientBoostedTrees(m) => m.n_features(),
        }
    }

    /// Validates the parameters and returns a shareable classifier.
    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>> {
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features() {
                return Err(Error::startup(format!(
                    "model lists {} feature names for {} columns",
                    names.len(),
                    self.n_features()
                )));
            }
        }

        match self.model {
            ModelKind::LogisticRegression(model) => {
                if model.coefficients.is_empty() {
                    return Err(Error::startup("logistic regression has no coefficients"));
                }
                if !model
                    .coefficients
                    .iter()
                    .chain(std::iter::once(&model.intercept))
                    .all(|v| v.is_finite())
                {
                    return Err(Error::startup(
                        "logistic regression parameters must be finite",
                    ));
                }
                Ok(Arc::new(model))
            }
            ModelKind::GradientBoostedTrees(model) => {
                if !model.base_score.is_finite() {
                    return Err(Error::startup("base_score must be finite"));
                }
                model.check()?;
                Ok(Arc::new(model))
            }
        }
    }
}
