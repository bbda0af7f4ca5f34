use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::{Classifier, ClassifierOutput};
use crate::error::PredictError;

/// Input tensor name of the exported model
const INPUT_NAME: &str = "input";
/// Predicted label output (i64, shape [1])
const LABEL_OUTPUT: &str = "label";
/// Class probability output (f32, shape [1, 2])
const PROBABILITY_OUTPUT: &str = "probabilities";

/// ONNX-exported classifier, e.g. a scikit-learn forest converted with zipmap disabled
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, PredictError> {
        let model_path = model_path.as_ref();
        info!("Loading ONNX model: {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| PredictError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PredictError::Model(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| PredictError::Model(format!("{}: {}", model_path.display(), e)))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

fn inference_error(err: impl std::fmt::Display) -> PredictError {
    PredictError::Classifier(err.to_string())
}

impl Classifier for OnnxClassifier {
    fn backend(&self) -> &'static str {
        "onnx"
    }

    fn classify(&self, features: &[f64]) -> Result<ClassifierOutput, PredictError> {
        let input_vec: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input_tensor =
            Tensor::from_array(([1usize, features.len()], input_vec)).map_err(inference_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::Classifier("ONNX session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .map_err(inference_error)?;

        let (_, labels) = outputs[LABEL_OUTPUT]
            .try_extract_tensor::<i64>()
            .map_err(inference_error)?;
        let (_, probs) = outputs[PROBABILITY_OUTPUT]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;

        let label = *labels
            .first()
            .ok_or_else(|| PredictError::Classifier("empty label output".to_string()))?;
        if probs.len() < 2 {
            return Err(PredictError::Classifier(format!(
                "expected 2 class probabilities, got {}",
                probs.len()
            )));
        }

        Ok(ClassifierOutput {
            label,
            probabilities: [probs[0] as f64, probs[1] as f64],
        })
    }
}
