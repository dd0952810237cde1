//! Prediction and ranking
//!
//! Feeds the model-input slices of the user and item matrices to the rating
//! model, de-normalizes the output and co-sorts scores, items and users by
//! descending predicted rating.

use crate::error::{RecsysError, Result};
use crate::layout::FeatureLayout;
use crate::model::RatingModel;
use crate::scaler::ScalerSet;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::cmp::Ordering;
use std::sync::Arc;

/// Ranked prediction output; all arrays share row order
#[derive(Debug, Clone)]
pub struct Prediction {
    /// `order[k]` is the input row shown at rank `k`
    pub order: Vec<usize>,
    /// De-normalized predictions, descending
    pub scores: Array1<f64>,
    /// Original (unscaled) item rows in ranked order
    pub items: Array2<f64>,
    /// Original (unscaled) user rows in ranked order
    pub users: Array2<f64>,
    /// Predictions below zero; reported, never clipped
    pub negative_predictions: usize,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reorder a per-row vector (e.g. the truth ratings) into ranked order
    pub fn rank(&self, values: ArrayView1<f64>) -> Result<Array1<f64>> {
        if values.len() != self.order.len() {
            return Err(RecsysError::shape(format!(
                "cannot rank {} values against {} predictions",
                values.len(),
                self.order.len()
            )));
        }
        Ok(values.select(Axis(0), &self.order))
    }
}

/// Stable descending argsort; NaN scores sink to the bottom
pub fn descending_order(scores: ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (scores[a], scores[b]);
        match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => y.total_cmp(&x),
        }
    });
    order
}

pub struct Predictor {
    model: Arc<dyn RatingModel>,
    scalers: ScalerSet,
    layout: Arc<FeatureLayout>,
    scale_data: bool,
}

impl Predictor {
    pub fn new(
        model: Arc<dyn RatingModel>,
        scalers: ScalerSet,
        layout: Arc<FeatureLayout>,
        scale_data: bool,
    ) -> Self {
        Self {
            model,
            scalers,
            layout,
            scale_data,
        }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn scale_data(&self) -> bool {
        self.scale_data
    }

    /// Predict a rating for every (user row, item row) pair and rank them
    ///
    /// When scaling is enabled the user and item scalers see the full rows,
    /// since they were fitted on the full training columns; the metadata
    /// columns are dropped only afterwards.
    pub fn predict(
        &self,
        user_vecs: ArrayView2<f64>,
        item_vecs: ArrayView2<f64>,
    ) -> Result<Prediction> {
        let start = std::time::Instant::now();
        let rows = item_vecs.nrows();

        if user_vecs.nrows() != rows {
            return Err(RecsysError::shape(format!(
                "user matrix has {} rows, item matrix has {}",
                user_vecs.nrows(),
                rows
            )));
        }
        self.layout.check_user_width(user_vecs)?;
        self.layout.check_item_width(item_vecs)?;

        let raw = if self.scale_data {
            let scaled_users = self.scalers.user.transform(user_vecs)?;
            let scaled_items = self.scalers.item.transform(item_vecs)?;
            self.model.predict(
                self.layout.user_model_input(scaled_users.view()),
                self.layout.item_model_input(scaled_items.view()),
            )?
        } else {
            self.model.predict(
                self.layout.user_model_input(user_vecs),
                self.layout.item_model_input(item_vecs),
            )?
        };

        if raw.dim() != (rows, 1) {
            return Err(RecsysError::Model(format!(
                "model returned shape {:?}, expected [{}, 1]",
                raw.shape(),
                rows
            )));
        }

        let display = self.scalers.target.inverse_transform(raw.view())?;
        let scores = display.column(0).to_owned();

        let negative_predictions = scores.iter().filter(|y| **y < 0.0).count();
        if negative_predictions > 0 {
            tracing::warn!(
                negative = negative_predictions,
                total = rows,
                "Expected all positive predictions, found negative ratings"
            );
        }

        let order = descending_order(scores.view());
        let prediction = Prediction {
            scores: scores.select(Axis(0), &order),
            items: item_vecs.select(Axis(0), &order),
            users: user_vecs.select(Axis(0), &order),
            order,
            negative_predictions,
        };

        tracing::debug!(
            "Ranked {} items in {}ms (scaled={})",
            rows,
            start.elapsed().as_millis(),
            self.scale_data
        );

        Ok(prediction)
    }
}
