mod artifact;
mod logistic;
mod trees;

pub use artifact::{ModelArtifact, ModelKind};
pub use logistic::LogisticRegression;
pub use trees::{GradientBoostedTrees, TreeNode};

use crate::Result;

/// Probability cut-off applied to the positive-class probability.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A pre-fitted binary classifier. Implementations are immutable after load
/// and are shared across request tasks without locking.
pub trait Classifier: Send + Sync {
    /// Number of columns the classifier was fitted on.
    fn n_features(&self) -> usize;

    /// Probability of the positive (churn) class for one feature vector.
    fn predict_proba(&self, features: &[f64]) -> Result<f64>;

    /// Discrete label: 1 when the churn probability exceeds
    /// [`DECISION_THRESHOLD`].
    fn predict(&self, features: &[f64]) -> Result<u8> {
        Ok(label_for(self.predict_proba(features)?))
    }
}

pub fn label_for(probability: f64) -> u8 {
    u8::from(probability > DECISION_THRESHOLD)
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
