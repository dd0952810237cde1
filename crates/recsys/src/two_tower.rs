//! Two-tower content model
//!
//! Each tower is a stack of dense layers applied to the model-input slice of
//! its side. Tower outputs are L2 normalized and scored by a row-wise dot
//! product, so the result is a cosine similarity in normalized rating units.

use crate::error::{RecsysError, Result};
use crate::model::RatingModel;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::Deserialize;
use std::path::Path;

const L2_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Linear,
}

/// Fully connected layer with a `(inputs, outputs)` kernel
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(weights: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Result<Self> {
        if weights.ncols() != bias.len() {
            return Err(RecsysError::Model(format!(
                "dense layer has {} outputs but {} biases",
                weights.ncols(),
                bias.len()
            )));
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    fn forward(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let z = x.dot(&self.weights) + &self.bias;
        match self.activation {
            Activation::Relu => z.mapv_into(|v| v.max(0.0)),
            Activation::Linear => z,
        }
    }
}

/// Stack of dense layers
#[derive(Debug, Clone)]
pub struct Tower {
    layers: Vec<DenseLayer>,
}

impl Tower {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(RecsysError::Model("tower has no layers".to_string()));
        }
        for pair in layers.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(RecsysError::Model(format!(
                    "layer with {} outputs feeds layer with {} inputs",
                    pair[0].outputs(),
                    pair[1].inputs()
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].inputs()
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    /// Forward pass followed by row-wise L2 normalization
    pub fn embed(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_width() {
            return Err(RecsysError::shape(format!(
                "tower expects {} input features, got {}",
                self.input_width(),
                x.ncols()
            )));
        }

        let mut out = self.layers[0].forward(x);
        for layer in &self.layers[1..] {
            out = layer.forward(out.view());
        }

        let norms = out
            .mapv(|v| v * v)
            .sum_axis(Axis(1))
            .mapv(|s| s.max(L2_EPSILON).sqrt())
            .insert_axis(Axis(1));
        Ok(out / &norms)
    }
}

/// User and item towers scored by dot product
#[derive(Debug, Clone)]
pub struct TwoTowerModel {
    user_tower: Tower,
    item_tower: Tower,
}

impl TwoTowerModel {
    pub fn new(user_tower: Tower, item_tower: Tower) -> Result<Self> {
        if user_tower.output_width() != item_tower.output_width() {
            return Err(RecsysError::Model(format!(
                "user tower embeds to {} dims, item tower to {}",
                user_tower.output_width(),
                item_tower.output_width()
            )));
        }
        Ok(Self {
            user_tower,
            item_tower,
        })
    }

    /// Parse exported weights: `{"user_tower": [layer, ...], "item_tower": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: TwoTowerSpec = serde_json::from_str(json)?;
        Self::new(spec.user_tower.build()?, spec.item_tower.build()?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RecsysError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        tracing::info!(
            "Loaded two-tower model from {} (user inputs={}, item inputs={}, embedding={})",
            path.display(),
            model.user_tower.input_width(),
            model.item_tower.input_width(),
            model.user_tower.output_width()
        );
        Ok(model)
    }
}

impl RatingModel for TwoTowerModel {
    fn predict(&self, users: ArrayView2<f64>, items: ArrayView2<f64>) -> Result<Array2<f64>> {
        if users.nrows() != items.nrows() {
            return Err(RecsysError::shape(format!(
                "user batch has {} rows, item batch has {}",
                users.nrows(),
                items.nrows()
            )));
        }
        let vu = self.user_tower.embed(users)?;
        let vm = self.item_tower.embed(items)?;
        Ok((vu * vm).sum_axis(Axis(1)).insert_axis(Axis(1)))
    }
}

#[derive(Debug, Deserialize)]
struct LayerSpec {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct TowerSpec {
    layers: Vec<LayerSpec>,
}

#[derive(Debug, Deserialize)]
struct TwoTowerSpec {
    user_tower: TowerSpec,
    item_tower: TowerSpec,
}

impl TowerSpec {
    fn build(self) -> Result<Tower> {
        let layers = self
            .layers
            .into_iter()
            .map(|layer| {
                let rows = layer.weights.len();
                let cols = layer.weights.first().map_or(0, Vec::len);
                if layer.weights.iter().any(|row| row.len() != cols) {
                    return Err(RecsysError::Model("ragged weight matrix".to_string()));
                }
                let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
                let weights = Array2::from_shape_vec((rows, cols), flat)?;
                DenseLayer::new(weights, Array1::from_vec(layer.bias), layer.activation)
            })
            .collect::<Result<Vec<_>>>()?;
        Tower::new(layers)
    }
}
