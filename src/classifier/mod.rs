//! Pre-fitted binary classifiers
//!
//! The battle model is opaque: anything trained on the same feature order and
//! categorical encoding can stand behind [`Classifier`].

mod forest;
mod onnx;

pub use forest::{DecisionTree, ForestClassifier};
pub use onnx::OnnxClassifier;

use std::path::Path;

use crate::error::PredictError;

/// Label and class probabilities of one inference call.
///
/// `probabilities[1]` is the probability of label 1 (side 1 wins),
/// `probabilities[0]` that of label 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOutput {
    pub label: i64,
    pub probabilities: [f64; 2],
}

/// A fitted binary classifier over the ordered feature vector
pub trait Classifier: Send + Sync {
    /// Short backend name for logs and health checks
    fn backend(&self) -> &'static str;

    /// Input width declared by the model artifact, when it declares one
    fn expected_features(&self) -> Option<usize> {
        None
    }

    fn classify(&self, features: &[f64]) -> Result<ClassifierOutput, PredictError>;
}

/// Load a classifier, choosing the backend from the file extension
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<Box<dyn Classifier>, PredictError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => Ok(Box::new(OnnxClassifier::load(path)?)),
        Some("json") => Ok(Box::new(ForestClassifier::load(path)?)),
        _ => Err(PredictError::Model(format!(
            "unsupported model format: {}",
            path.display()
        ))),
    }
}

/// 27-input logistic model: side 1's logit is 0.05 * speed_diff + 0.5 * type_advantage
#[cfg(test)]
pub(crate) const LOGISTIC_ONNX_FIXTURE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/logistic_speed.onnx");
