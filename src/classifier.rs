//! Frozen ambiguity classifier artifact
//!
//! The model is trained offline and shipped as JSON. It is loaded once at
//! startup and never modified; shape problems are rejected at load time so
//! prediction itself cannot fail.

use crate::ambiguity::{AmbiguityClassifier, FeatureVector, FEATURE_COUNT};
use crate::error::{RecommenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    /// sigmoid(w·x + b) >= threshold
    Logistic {
        weights: [f64; FEATURE_COUNT],
        bias: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    /// Binary tree in array form, root at index 0; `x[feature] <= threshold` goes left
    DecisionTree { nodes: Vec<TreeNode> },
}

impl ClassifierModel {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecommenderError::Classifier(format!(
                "Failed to read classifier artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        let model = Self::from_json(&content)?;
        info!("Loaded {} ambiguity classifier from {}", model.kind(), path.display());
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let model: ClassifierModel = serde_json::from_str(content).map_err(|e| {
            RecommenderError::Classifier(format!("Invalid classifier artifact: {}", e))
        })?;
        model.validate()?;
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierModel::Logistic { .. } => "logistic",
            ClassifierModel::DecisionTree { .. } => "decision_tree",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ClassifierModel::Logistic {
                weights,
                bias,
                threshold,
            } => {
                if weights.iter().chain([bias, threshold]).any(|v| !v.is_finite()) {
                    return Err(RecommenderError::Classifier(
                        "Logistic parameters must be finite".to_string(),
                    ));
                }
                Ok(())
            }
            ClassifierModel::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err(RecommenderError::Classifier(
                        "Decision tree has no nodes".to_string(),
                    ));
                }
                for (idx, node) in nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } = node
                    {
                        if *feature >= FEATURE_COUNT {
                            return Err(RecommenderError::Classifier(format!(
                                "Node {} splits on feature {} (only {} features)",
                                idx, feature, FEATURE_COUNT
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(RecommenderError::Classifier(format!(
                                "Node {} has a non-finite threshold",
                                idx
                            )));
                        }
                        // children after parents keeps every walk finite
                        for child in [left, right] {
                            if *child <= idx || *child >= nodes.len() {
                                return Err(RecommenderError::Classifier(format!(
                                    "Node {} has invalid child index {}",
                                    idx, child
                                )));
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl AmbiguityClassifier for ClassifierModel {
    fn predict(&self, features: &FeatureVector) -> bool {
        let x = features.as_array();
        match self {
            ClassifierModel::Logistic {
                weights,
                bias,
                threshold,
            } => {
                let z: f64 = weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + bias;
                let p = 1.0 / (1.0 + (-z).exp());
                p >= *threshold
            }
            ClassifierModel::DecisionTree { nodes } => {
                let mut idx = 0;
                loop {
                    match &nodes[idx] {
                        TreeNode::Leaf { leaf } => return *leaf,
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            idx = if x[*feature] <= *threshold { *left } else { *right };
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn features(symbol_count: usize, duplicate_ratio: f64, has_entities: bool) -> FeatureVector {
        FeatureVector {
            symbol_count,
            duplicate_ratio,
            has_entities,
        }
    }

    #[test]
    fn test_logistic_prediction() {
        let model = ClassifierModel::from_json(
            r#"{"kind": "logistic", "weights": [-1.2, 0.8, -2.0], "bias": 1.5}"#,
        )
        .unwrap();
        assert!(model.predict(&features(0, 0.0, false)));
        assert!(model.predict(&features(1, 0.0, false)));
        assert!(!model.predict(&features(1, 0.0, true)));
        assert!(!model.predict(&features(3, 0.0, false)));
    }

    #[test]
    fn test_logistic_wrong_width_rejected() {
        let err = ClassifierModel::from_json(
            r#"{"kind": "logistic", "weights": [1.0, 2.0], "bias": 0.0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecommenderError::Classifier(_)));
    }

    #[test]
    fn test_decision_tree_prediction() {
        // symbol_count <= 1.5 ? (has_entities <= 0.5 ? ambiguous : clear) : clear
        let model = ClassifierModel::from_json(
            r#"{"kind": "decision_tree", "nodes": [
                {"feature": 0, "threshold": 1.5, "left": 1, "right": 4},
                {"feature": 2, "threshold": 0.5, "left": 2, "right": 3},
                {"leaf": true},
                {"leaf": false},
                {"leaf": false}
            ]}"#,
        )
        .unwrap();
        assert!(model.predict(&features(1, 0.0, false)));
        assert!(!model.predict(&features(1, 0.0, true)));
        assert!(!model.predict(&features(2, 0.5, false)));
    }

    #[test]
    fn test_decision_tree_cycle_rejected() {
        let err = ClassifierModel::from_json(
            r#"{"kind": "decision_tree", "nodes": [
                {"feature": 0, "threshold": 1.0, "left": 1, "right": 0},
                {"leaf": true}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid child index"));
    }

    #[test]
    fn test_decision_tree_bad_feature_rejected() {
        let err = ClassifierModel::from_json(
            r#"{"kind": "decision_tree", "nodes": [
                {"feature": 3, "threshold": 1.0, "left": 1, "right": 2},
                {"leaf": true},
                {"leaf": false}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecommenderError::Classifier(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kind": "logistic", "weights": [0.0, 0.0, 0.0], "bias": -3.0}}"#
        )
        .unwrap();
        let model = ClassifierModel::load(file.path()).unwrap();
        assert_eq!(model.kind(), "logistic");
        assert!(!model.predict(&features(0, 0.0, false)));
    }

    #[test]
    fn test_missing_file_is_classifier_error() {
        let err = ClassifierModel::load(Path::new("/nonexistent/ambiguity_clf.json")).unwrap_err();
        assert!(matches!(err, RecommenderError::Classifier(_)));
    }
}
