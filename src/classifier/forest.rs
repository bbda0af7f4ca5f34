//! Decision forest evaluated from a JSON tree dump
//!
//! Tree arrays follow the scikit-learn `tree_` layout: node `i` is a leaf when
//! `children_left[i] == -1`, otherwise a sample goes left when
//! `x[feature[i]] <= threshold[i]`. Forest probabilities are the mean of the
//! normalized leaf class counts.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use super::{Classifier, ClassifierOutput};
use crate::error::PredictError;

const LEAF: i64 = -1;

/// One fitted tree
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weights), one entry per class
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(
        &self,
        index: usize,
        n_classes: usize,
        n_features: Option<usize>,
    ) -> Result<(), PredictError> {
        let nodes = self.children_left.len();
        let invalid = |msg: String| PredictError::Model(format!("tree {}: {}", index, msg));

        if nodes == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(invalid("node arrays differ in length".to_string()));
        }

        for node in 0..nodes {
            if self.value[node].len() != n_classes {
                return Err(invalid(format!(
                    "node {} has {} class values, expected {}",
                    node,
                    self.value[node].len(),
                    n_classes
                )));
            }
            if self.children_left[node] == LEAF {
                continue;
            }
            for child in [self.children_left[node], self.children_right[node]] {
                // children always come after their parent in a fitted tree
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(invalid(format!("node {} has invalid child {}", node, child)));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || n_features.is_some_and(|n| feature as usize >= n) {
                return Err(invalid(format!(
                    "node {} splits on invalid feature {}",
                    node, feature
                )));
            }
        }

        Ok(())
    }

    /// Class distribution of the leaf reached by `features`, normalized to sum 1
    fn leaf_distribution(&self, features: &[f64]) -> Result<&[f64], PredictError> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            let x = *features.get(feature).ok_or_else(|| {
                PredictError::Classifier(format!(
                    "tree splits on feature {} but input has {} features",
                    feature,
                    features.len()
                ))
            })?;
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(&self.value[node])
    }
}

#[derive(Debug, Deserialize)]
struct ForestFile {
    #[serde(default)]
    n_features: Option<usize>,
    #[serde(default = "default_classes")]
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

/// Random forest classifier over two classes
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    n_features: Option<usize>,
    classes: [i64; 2],
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, PredictError> {
        let model_path = model_path.as_ref();
        let content = fs::read_to_string(model_path)
            .map_err(|e| PredictError::Model(format!("{}: {}", model_path.display(), e)))?;
        let forest = Self::from_json(&content)?;
        info!(
            "Loaded decision forest with {} trees from {:?}",
            forest.trees.len(),
            model_path
        );
        Ok(forest)
    }

    pub fn from_json(content: &str) -> Result<Self, PredictError> {
        let file: ForestFile = serde_json::from_str(content)
            .map_err(|e| PredictError::Model(format!("invalid forest model: {}", e)))?;
        Self::new(file.trees, file.classes, file.n_features)
    }

    pub fn new(
        trees: Vec<DecisionTree>,
        classes: Vec<i64>,
        n_features: Option<usize>,
    ) -> Result<Self, PredictError> {
        let classes: [i64; 2] = classes.try_into().map_err(|c: Vec<i64>| {
            PredictError::Model(format!("expected 2 classes, got {}", c.len()))
        })?;
        if trees.is_empty() {
            return Err(PredictError::Model("forest has no trees".to_string()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i, classes.len(), n_features)?;
        }

        Ok(Self {
            n_features,
            classes,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn backend(&self) -> &'static str {
        "forest"
    }

    fn expected_features(&self) -> Option<usize> {
        self.n_features
    }

    fn classify(&self, features: &[f64]) -> Result<ClassifierOutput, PredictError> {
        if let Some(n) = self.n_features {
            if features.len() != n {
                return Err(PredictError::Classifier(format!(
                    "expected {} features, got {}",
                    n,
                    features.len()
                )));
            }
        }

        let mut probabilities = [0.0f64; 2];
        for tree in &self.trees {
            let leaf = tree.leaf_distribution(features)?;
            let sum: f64 = leaf.iter().sum();
            for (acc, &v) in probabilities.iter_mut().zip(leaf) {
                *acc += if sum > 0.0 { v / sum } else { 0.5 };
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= n_trees;
        }

        // argmax, first class on ties
        let label = if probabilities[1] > probabilities[0] {
            self.classes[1]
        } else {
            self.classes[0]
        };

        Ok(ClassifierOutput {
            label,
            probabilities,
        })
    }
}
