//! User vector assembly
//!
//! The model always consumes equally tall (user, item) batches, so a single
//! user row is tiled once per catalog item.

use crate::catalog::RatingsIndex;
use crate::error::{RecsysError, Result};
use crate::layout::{ITEM_ID_COLUMN, USER_ID_COLUMN};
use crate::types::{MovieId, UserId};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Tiled user matrix plus per-item prior ratings (0 = not rated)
#[derive(Debug, Clone)]
pub struct KnownUserVectors {
    pub user_vecs: Array2<f64>,
    pub truth: Array1<f64>,
}

/// Repeat `user_vec` into a `(num_items, width)` matrix
pub fn build_for_new_user(user_vec: ArrayView1<f64>, num_items: usize) -> Array2<f64> {
    Array2::from_shape_fn((num_items, user_vec.len()), |(_, j)| user_vec[j])
}

/// Assemble the user matrix and truth vector for a user with known ratings
///
/// Returns `Ok(None)` when the user is not in the ratings index. A user that
/// has ratings but no training row is an inconsistent dataset and returns
/// `InconsistentUser`.
pub fn build_for_known_user(
    user_id: UserId,
    user_train: ArrayView2<f64>,
    item_vecs: ArrayView2<f64>,
    ratings: &RatingsIndex,
) -> Result<Option<KnownUserVectors>> {
    let Some(user_ratings) = ratings.get(user_id) else {
        tracing::warn!(user_id, "Unknown user id");
        return Ok(None);
    };

    let user_vec = user_train
        .axis_iter(Axis(0))
        .find(|row| row[USER_ID_COLUMN] == user_id as f64)
        .ok_or_else(|| {
            tracing::error!(user_id, "User has ratings but no row in user training data");
            RecsysError::InconsistentUser(user_id)
        })?;

    let num_items = item_vecs.nrows();
    let user_vecs = build_for_new_user(user_vec, num_items);

    let truth = item_vecs
        .column(ITEM_ID_COLUMN)
        .mapv(|id| user_ratings.rating(id as MovieId).unwrap_or(0.0));

    tracing::debug!(
        user_id,
        num_items,
        rated = truth.iter().filter(|r| **r != 0.0).count(),
        "Assembled known-user vectors"
    );

    Ok(Some(KnownUserVectors { user_vecs, truth }))
}
