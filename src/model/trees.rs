use super::{Classifier, sigmoid};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One node of a regression tree stored as a flat array rooted at index 0.
/// Rows with `x[feature] < threshold` descend to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Boosted ensemble of regression trees with a logistic link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub n_features: usize,
    /// Initial margin added before the tree outputs.
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Vec<TreeNode>>,
}

impl GradientBoostedTrees {
    /// Checks every tree is non-empty, references in-bounds features and only
    /// points forward, so evaluation always reaches a leaf.
    pub fn check(&self) -> Result<()> {
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(Error::startup(format!("tree {t} has no nodes")));
            }
            for (i, node) in tree.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return Err(Error::startup(format!(
                                "tree {t} node {i} splits on feature {feature} of {}",
                                self.n_features
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(Error::startup(format!(
                                "tree {t} node {i} has a non-finite threshold"
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.len() {
                                return Err(Error::startup(format!(
                                    "tree {t} node {i} has invalid child {child}"
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if !value.is_finite() {
                            return Err(Error::startup(format!(
                                "tree {t} node {i} has a non-finite leaf"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn margin(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(Error::prediction(format!(
                "model expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += leaf_value(tree, features)?;
        }
        Ok(margin)
    }
}

fn leaf_value(tree: &[TreeNode], features: &[f64]) -> Result<f64> {
    let mut idx = 0;
    // Children always have larger indices, so at most `len` steps are needed.
    for _ in 0..tree.len() {
        match tree.get(idx) {
            Some(TreeNode::Leaf { value }) => return Ok(*value),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let x = features
                    .get(*feature)
                    .ok_or_else(|| Error::prediction(format!("feature {feature} out of range")))?;
                idx = if *x < *threshold { *left } else { *right };
            }
            None => break,
        }
    }
    Err(Error::prediction("tree traversal did not reach a leaf"))
}

impl Classifier for GradientBoostedTrees {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.margin(features)?))
    }
}
