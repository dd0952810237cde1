//! Content-based movie recommendation engine
//!
//! Serves rating predictions from a trained two-tower network over a movie
//! catalog. Every query ranks the whole catalog for one user, either a
//! free-form new-user feature row or a known user joined with their past
//! ratings, and renders the top rows as a table.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
#[cfg(feature = "onnx")]
pub mod inference;
pub mod layout;
pub mod loader;
pub mod model;
pub mod predictor;
pub mod presenter;
pub mod recommendation;
pub mod scaler;
pub mod server;
pub mod two_tower;
pub mod types;

// Re-export key types
pub use assembler::{build_for_known_user, build_for_new_user, KnownUserVectors};
pub use catalog::{MovieCatalog, RatingsIndex};
pub use config::RecsysConfig;
pub use error::{RecsysError, Result};
#[cfg(feature = "onnx")]
pub use inference::{OnnxRatingModel, OnnxSignature};
pub use layout::FeatureLayout;
pub use loader::ContentDataset;
pub use model::{FnModel, RatingModel};
pub use predictor::{descending_order, Prediction, Predictor};
pub use presenter::{
    get_item_genre, preview_rows, render_existing_user, render_new_user, split_str, Cell,
    FloatFormat, Table, EXISTING_USER_HEADERS, NEW_USER_HEADERS,
};
pub use recommendation::{load_model, ContentRecommender, RankedWithTruth, TrainingSide};
pub use scaler::{FeatureScaler, IdentityScaler, MinMaxScaler, ScalerSet, StandardScaler};
pub use two_tower::TwoTowerModel;
pub use types::*;

#[cfg(test)]
mod tests;
