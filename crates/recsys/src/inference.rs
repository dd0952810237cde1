//! ONNX Runtime rating model
//!
//! Runs an exported two-tower network with two named inputs (user slice,
//! item slice) and one `(N, 1)` output.

use crate::error::{RecsysError, Result};
use crate::model::RatingModel;
use ndarray::{Array2, ArrayView2};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use std::path::Path;
use std::sync::Mutex;

/// Tensor names of the exported graph
#[derive(Debug, Clone)]
pub struct OnnxSignature {
    pub user_input: String,
    pub item_input: String,
    pub output: String,
}

impl Default for OnnxSignature {
    fn default() -> Self {
        Self {
            user_input: "user_input".to_string(),
            item_input: "item_input".to_string(),
            output: "rating".to_string(),
        }
    }
}

pub struct OnnxRatingModel {
    session: Mutex<Session>,
    signature: OnnxSignature,
}

fn model_error(err: impl std::fmt::Display) -> RecsysError {
    RecsysError::Model(err.to_string())
}

impl OnnxRatingModel {
    pub fn new(model_path: impl AsRef<Path>, signature: OnnxSignature) -> Result<Self> {
        let start = std::time::Instant::now();

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(model_path.as_ref()))
            .map_err(model_error)?;

        tracing::info!(
            "ONNX rating model loaded in {:.2}s from {}",
            start.elapsed().as_secs_f64(),
            model_path.as_ref().display()
        );

        Ok(Self {
            session: Mutex::new(session),
            signature,
        })
    }
}

impl RatingModel for OnnxRatingModel {
    fn predict(&self, users: ArrayView2<f64>, items: ArrayView2<f64>) -> Result<Array2<f64>> {
        let rows = users.nrows();
        if rows != items.nrows() {
            return Err(RecsysError::shape(format!(
                "user batch has {} rows, item batch has {}",
                rows,
                items.nrows()
            )));
        }

        let user_tensor = Tensor::from_array(users.mapv(|v| v as f32)).map_err(model_error)?;
        let item_tensor = Tensor::from_array(items.mapv(|v| v as f32)).map_err(model_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| RecsysError::Model("ONNX session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![
                self.signature.user_input.as_str() => user_tensor,
                self.signature.item_input.as_str() => item_tensor
            ])
            .map_err(model_error)?;

        let output = outputs[self.signature.output.as_str()]
            .try_extract_array::<f32>()
            .map_err(model_error)?
            .mapv(f64::from);

        output
            .into_shape_with_order((rows, 1))
            .map_err(model_error)
    }
}
