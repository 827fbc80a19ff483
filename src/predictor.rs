use crate::{
    Error, Result,
    config::{ModelConfig, PipelineConfig},
    features::FeatureLayout,
    model::{Classifier, ModelArtifact, label_for},
    preprocessing::MinMaxScaler,
    schema::CustomerRecord,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_churn: u8,
    pub churn_probability: f64,
}

/// Loaded artifacts plus the column layout they were fitted on.
///
/// Built once during startup and shared read-only between requests.
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    scaler: Option<MinMaxScaler>,
    layout: FeatureLayout,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("n_features", &self.classifier.n_features())
            .field("scaled", &self.scaler.is_some())
            .field("layout", &self.layout)
            .finish()
    }
}

impl Predictor {
    /// Loads the model (and scaler, when scaling is enabled) from disk.
    /// Any failure is a [`Error::Startup`].
    pub async fn load(model: &ModelConfig, pipeline: &PipelineConfig) -> Result<Self> {
        let artifact = ModelArtifact::load(&model.model_path)
            .await
            .map_err(|e| {
                error!("Model loading failed: {}", e);
                Error::startup(format!("model loading failed ({}): {}", model.model_path, e))
            })?;
        info!("Model loaded successfully from {}", model.model_path);

        let scaler = if pipeline.scaling {
            let path = model
                .scaler_path
                .as_deref()
                .ok_or_else(|| Error::startup("scaling enabled without a scaler path"))?;
            let scaler = MinMaxScaler::load(path).await.map_err(|e| {
                error!("Scaler loading failed: {}", e);
                Error::startup(format!("scaler loading failed ({}): {}", path, e))
            })?;
            info!("Scaler loaded successfully from {}", path);
            Some(scaler)
        } else {
            None
        };

        Self::from_artifacts(artifact, scaler)
    }

    pub fn from_artifacts(artifact: ModelArtifact, scaler: Option<MinMaxScaler>) -> Result<Self> {
        let layout = if scaler.is_some() {
            FeatureLayout::Grouped
        } else {
            FeatureLayout::Flat
        };

        if let Some(names) = &artifact.feature_names {
            check_names("model", names, &layout.column_names())?;
        }
        let classifier = artifact.into_classifier()?;

        Self::new(classifier, scaler, layout)
    }

    pub fn new(
        classifier: Arc<dyn Classifier>,
        scaler: Option<MinMaxScaler>,
        layout: FeatureLayout,
    ) -> Result<Self> {
        if classifier.n_features() != layout.width() {
            return Err(Error::startup(format!(
                "model expects {} features but the layout provides {}",
                classifier.n_features(),
                layout.width()
            )));
        }

        if let Some(scaler) = &scaler {
            let scalable: Vec<&str> = layout
                .scalable_fields()
                .into_iter()
                .map(|f| f.name())
                .collect();
            if scaler.n_features() != scalable.len() {
                return Err(Error::startup(format!(
                    "scaler expects {} columns but {} are scaled",
                    scaler.n_features(),
                    scalable.len()
                )));
            }
            if let Some(names) = &scaler.feature_names {
                check_names("scaler", names, &scalable)?;
            }
        }

        Ok(Self {
            classifier,
            scaler,
            layout,
        })
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    /// Builds the classifier input for `record`.
    pub fn features(&self, record: &CustomerRecord) -> Result<Vec<f64>> {
        let assembled = self.layout.assemble(record);
        match &self.scaler {
            Some(scaler) => {
                let mut columns = scaler.transform(&assembled.scalable)?;
                columns.extend(assembled.passthrough);
                Ok(columns)
            }
            None => Ok(assembled.concat()),
        }
    }

    pub fn predict(&self, record: &CustomerRecord) -> Result<PredictionResult> {
        let features = self.features(record)?;
        let probability = self.classifier.predict_proba(&features)?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(Error::prediction(format!(
                "classifier returned invalid probability {}",
                probability
            )));
        }

        debug!("Predicted churn probability {:.4}", probability);
        Ok(PredictionResult {
            predicted_churn: label_for(probability),
            churn_probability: probability,
        })
    }
}

fn check_names(artifact: &str, names: &[String], expected: &[&str]) -> Result<()> {
    if names.len() != expected.len() || names.iter().zip(expected).any(|(a, b)| a != b) {
        return Err(Error::startup(format!(
            "{} was fitted on columns {:?}, expected {:?}",
            artifact, names, expected
        )));
    }
    Ok(())
}
