//! Content-based recommendation pipeline
//!
//! Steps for every query:
//! 1. Assemble a user matrix matching the item catalog (plus truth ratings
//!    for existing users)
//! 2. Predict and rank every catalog item
//! 3. Render the ranked rows as a table

use crate::assembler::{build_for_known_user, build_for_new_user};
use crate::config::RecsysConfig;
use crate::error::{RecsysError, Result};
use crate::layout::FeatureLayout;
use crate::loader::ContentDataset;
use crate::model::RatingModel;
use crate::predictor::{Prediction, Predictor};
use crate::presenter::{preview_rows, render_existing_user, render_new_user, split_str, Table};
use crate::scaler::ScalerSet;
use crate::two_tower::TwoTowerModel;
use crate::types::UserId;
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Header width above which preview headers are split
const PREVIEW_HEADER_WIDTH: usize = 5;

/// Which training matrix to preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingSide {
    User,
    Item,
}

/// Ranked catalog for an existing user with truth ratings in ranked order
#[derive(Debug, Clone)]
pub struct RankedWithTruth {
    pub prediction: Prediction,
    pub truth: Array1<f64>,
}

pub struct ContentRecommender {
    dataset: ContentDataset,
    layout: Arc<FeatureLayout>,
    predictor: Predictor,
}

impl ContentRecommender {
    pub fn new(
        dataset: ContentDataset,
        model: Arc<dyn RatingModel>,
        scalers: ScalerSet,
        user_vector_start: usize,
        item_vector_start: usize,
        scale_data: bool,
    ) -> Result<Self> {
        let layout = Arc::new(FeatureLayout::new(
            dataset.user_features.clone(),
            dataset.item_features.clone(),
            user_vector_start,
            item_vector_start,
        )?);
        layout.check_item_width(dataset.item_vecs.view())?;
        layout.check_user_width(dataset.user_train.view())?;

        let predictor = Predictor::new(model, scalers, Arc::clone(&layout), scale_data);

        Ok(Self {
            dataset,
            layout,
            predictor,
        })
    }

    /// Load dataset, model and scalers as described by the configuration
    pub fn from_config(config: &RecsysConfig) -> Result<Self> {
        let dataset = ContentDataset::load(&config.data.dir)?;
        let model = load_model(&config.data.model_path)?;
        let scalers = match &config.data.scalers_path {
            Some(path) => ScalerSet::from_path(path)?,
            None => {
                tracing::warn!("No scalers configured, using identity scaling");
                ScalerSet::identity()
            }
        };

        Self::new(
            dataset,
            model,
            scalers,
            config.layout.user_vector_start,
            config.layout.item_vector_start,
            config.prediction.scale_data,
        )
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn dataset(&self) -> &ContentDataset {
        &self.dataset
    }

    /// Rank every catalog item for a free-form user feature row
    pub fn rank_for_new_user(&self, user_vec: ArrayView1<f64>) -> Result<Prediction> {
        self.layout.check_user_row(user_vec)?;
        let item_vecs = self.dataset.item_vecs.view();
        let user_vecs = build_for_new_user(user_vec, item_vecs.nrows());
        self.predictor.predict(user_vecs.view(), item_vecs)
    }

    /// Rank every catalog item for a known user; `None` for an unknown user
    pub fn rank_for_existing_user(&self, user_id: UserId) -> Result<Option<RankedWithTruth>> {
        let item_vecs = self.dataset.item_vecs.view();
        let Some(vectors) = build_for_known_user(
            user_id,
            self.dataset.user_train.view(),
            item_vecs,
            &self.dataset.ratings,
        )?
        else {
            return Ok(None);
        };

        let prediction = self.predictor.predict(vectors.user_vecs.view(), item_vecs)?;
        let truth = prediction.rank(vectors.truth.view())?;
        Ok(Some(RankedWithTruth { prediction, truth }))
    }

    pub fn recommend_new_user(&self, user_vec: ArrayView1<f64>, max_count: usize) -> Result<Table> {
        let prediction = self.rank_for_new_user(user_vec)?;
        render_new_user(&prediction, &self.dataset.movies, max_count)
    }

    pub fn recommend_existing_user(
        &self,
        user_id: UserId,
        max_count: usize,
    ) -> Result<Option<Table>> {
        let Some(ranked) = self.rank_for_existing_user(user_id)? else {
            return Ok(None);
        };
        let table = render_existing_user(
            &ranked.prediction,
            ranked.truth.view(),
            &self.layout,
            &self.dataset.movies,
            max_count,
        )?;
        tracing::debug!(user_id, rows = table.len(), "Rendered existing-user table");
        Ok(Some(table))
    }

    /// First rows of a training matrix with wrapped feature headers
    pub fn preview_training(&self, side: TrainingSide, max_count: usize) -> Result<Table> {
        let (matrix, features) = match side {
            TrainingSide::User => (&self.dataset.user_train, &self.dataset.user_features),
            TrainingSide::Item => (&self.dataset.item_train, &self.dataset.item_features),
        };
        let headers = split_str(features, PREVIEW_HEADER_WIDTH);
        preview_rows(matrix.view(), &headers, max_count)
    }
}

/// Pick a model implementation from the file extension
pub fn load_model(path: &Path) -> Result<Arc<dyn RatingModel>> {
    match path.extension().and_then(|e| e.to_str()) {
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Arc::new(crate::inference::OnnxRatingModel::new(
            path,
            crate::inference::OnnxSignature::default(),
        )?)),
        Some("json") => Ok(Arc::new(TwoTowerModel::from_path(path)?)),
        _ => Err(RecsysError::Config(format!(
            "unsupported model file {}",
            path.display()
        ))),
    }
}
