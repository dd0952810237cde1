//! Feature scaling capabilities
//!
//! The predictor only needs `transform` on the user/item side and
//! `inverse_transform` on the target side. Fitting happens offline; the
//! fitted parameters are deserialised from the exported scaler file.

use crate::error::{RecsysError, Result};
use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Fitted, column-wise feature transform
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;

    fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// Pass-through scaler
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl FeatureScaler for IdentityScaler {
    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        Ok(x.to_owned())
    }

    fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        Ok(x.to_owned())
    }
}

/// Standardisation: `(x - mean) / scale`
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Zero scales are replaced by 1.0 so constant columns pass through centred.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(RecsysError::Scaler(format!(
                "mean has {} entries, scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect::<Vec<_>>();
        Ok(Self {
            mean: Array1::from_vec(mean),
            scale: Array1::from_vec(scale),
        })
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(x, self.mean.len())?;
        Ok((&x - &self.mean) / &self.scale)
    }

    fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(x, self.mean.len())?;
        Ok(&x * &self.scale + &self.mean)
    }
}

/// Range scaling: `x * scale + min`
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
}

impl MinMaxScaler {
    /// Build from already-derived `min` and `scale` vectors
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if min.len() != scale.len() {
            return Err(RecsysError::Scaler(format!(
                "min has {} entries, scale has {}",
                min.len(),
                scale.len()
            )));
        }
        if scale.iter().any(|s| *s == 0.0) {
            return Err(RecsysError::Scaler(
                "min-max scale must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            min: Array1::from_vec(min),
            scale: Array1::from_vec(scale),
        })
    }

    /// Build from the observed data range and the target feature range
    pub fn from_data_range(
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        feature_range: (f64, f64),
    ) -> Result<Self> {
        if data_min.len() != data_max.len() {
            return Err(RecsysError::Scaler(format!(
                "data_min has {} entries, data_max has {}",
                data_min.len(),
                data_max.len()
            )));
        }
        let (low, high) = feature_range;
        let scale: Vec<f64> = data_min
            .iter()
            .zip(&data_max)
            .map(|(lo, hi)| {
                let range = hi - lo;
                let range = if range == 0.0 { 1.0 } else { range };
                (high - low) / range
            })
            .collect();
        let min = data_min
            .iter()
            .zip(&scale)
            .map(|(lo, s)| low - lo * s)
            .collect();
        Self::new(min, scale)
    }
}

impl FeatureScaler for MinMaxScaler {
    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(x, self.min.len())?;
        Ok(&x * &self.scale + &self.min)
    }

    fn inverse_transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(x, self.min.len())?;
        Ok((&x - &self.min) / &self.scale)
    }
}

fn check_width(x: ArrayView2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(RecsysError::Scaler(format!(
            "input has {} columns, scaler was fitted on {}",
            x.ncols(),
            expected
        )));
    }
    Ok(())
}

/// Serialized form of one fitted scaler
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    Identity,
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl ScalerSpec {
    pub fn build(self) -> Result<Arc<dyn FeatureScaler>> {
        Ok(match self {
            ScalerSpec::Identity => Arc::new(IdentityScaler),
            ScalerSpec::Standard { mean, scale } => Arc::new(StandardScaler::new(mean, scale)?),
            ScalerSpec::MinMax { min, scale } => Arc::new(MinMaxScaler::new(min, scale)?),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScalerSetSpec {
    user: ScalerSpec,
    item: ScalerSpec,
    target: ScalerSpec,
}

/// The three fitted scalers consumed by the predictor
#[derive(Clone)]
pub struct ScalerSet {
    pub user: Arc<dyn FeatureScaler>,
    pub item: Arc<dyn FeatureScaler>,
    pub target: Arc<dyn FeatureScaler>,
}

impl ScalerSet {
    pub fn new(
        user: Arc<dyn FeatureScaler>,
        item: Arc<dyn FeatureScaler>,
        target: Arc<dyn FeatureScaler>,
    ) -> Self {
        Self { user, item, target }
    }

    pub fn identity() -> Self {
        Self::new(
            Arc::new(IdentityScaler),
            Arc::new(IdentityScaler),
            Arc::new(IdentityScaler),
        )
    }

    /// Parse `{"user": {...}, "item": {...}, "target": {...}}`
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: ScalerSetSpec = serde_json::from_str(json)?;
        Ok(Self::new(
            spec.user.build()?,
            spec.item.build()?,
            spec.target.build()?,
        ))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RecsysError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scalers = Self::from_json(&json)?;
        tracing::info!("Loaded scalers from {}", path.display());
        Ok(scalers)
    }
}

impl std::fmt::Debug for ScalerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalerSet").finish_non_exhaustive()
    }
}
