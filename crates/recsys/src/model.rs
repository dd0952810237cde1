//! Rating model capability
//!
//! A model scores equally tall batches of user and item model-input rows and
//! returns one normalized prediction per row, shaped `(N, 1)`.

use crate::error::Result;
use ndarray::{Array2, ArrayView2};

pub trait RatingModel: Send + Sync {
    fn predict(&self, users: ArrayView2<f64>, items: ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// Adapts a plain function or closure into a [`RatingModel`]
pub struct FnModel<F> {
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(ArrayView2<f64>, ArrayView2<f64>) -> Result<Array2<f64>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RatingModel for FnModel<F>
where
    F: Fn(ArrayView2<f64>, ArrayView2<f64>) -> Result<Array2<f64>> + Send + Sync,
{
    fn predict(&self, users: ArrayView2<f64>, items: ArrayView2<f64>) -> Result<Array2<f64>> {
        (self.f)(users, items)
    }
}
