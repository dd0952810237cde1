//! Column layout of user and item vectors
//!
//! Columns `[0..uvs)` of a user row and `[0..ivs)` of an item row carry
//! identity and metadata and are never fed to the model. Item columns
//! `[ivs..)` are one-hot genre indicators whose order matches the per-genre
//! average block starting at user column `uvs`.

use crate::error::{RecsysError, Result};
use ndarray::{s, ArrayView1, ArrayView2};

/// Item column holding the movie id
pub const ITEM_ID_COLUMN: usize = 0;
/// Item column holding the movie's global average rating
pub const ITEM_AVERAGE_COLUMN: usize = 2;
/// User column holding the user id
pub const USER_ID_COLUMN: usize = 0;

/// Validated feature layout shared by the assembler, predictor and presenter
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    user_features: Vec<String>,
    item_features: Vec<String>,
    user_vector_start: usize,
    item_vector_start: usize,
}

impl FeatureLayout {
    /// Build a layout from the training header names and the two start offsets
    ///
    /// # Errors
    /// Returns `InvalidLayout` if an offset is past the end of its header, if
    /// the item metadata columns do not include the average-rating column, or
    /// if the user genre-average block is narrower than the item genre block.
    pub fn new(
        user_features: Vec<String>,
        item_features: Vec<String>,
        user_vector_start: usize,
        item_vector_start: usize,
    ) -> Result<Self> {
        if user_vector_start > user_features.len() {
            return Err(RecsysError::InvalidLayout(format!(
                "user vector start {} exceeds user width {}",
                user_vector_start,
                user_features.len()
            )));
        }
        if item_vector_start > item_features.len() {
            return Err(RecsysError::InvalidLayout(format!(
                "item vector start {} exceeds item width {}",
                item_vector_start,
                item_features.len()
            )));
        }
        if item_vector_start <= ITEM_AVERAGE_COLUMN {
            return Err(RecsysError::InvalidLayout(format!(
                "item vector start {} overlaps metadata column {}",
                item_vector_start, ITEM_AVERAGE_COLUMN
            )));
        }
        if user_vector_start <= USER_ID_COLUMN {
            return Err(RecsysError::InvalidLayout(
                "user vector start must leave the user id column out of the model input"
                    .to_string(),
            ));
        }

        let genre_count = item_features.len() - item_vector_start;
        let user_block = user_features.len() - user_vector_start;
        if user_block < genre_count {
            return Err(RecsysError::InvalidLayout(format!(
                "user genre block has {} columns, item genre block has {}",
                user_block, genre_count
            )));
        }

        Ok(Self {
            user_features,
            item_features,
            user_vector_start,
            item_vector_start,
        })
    }

    pub fn user_vector_start(&self) -> usize {
        self.user_vector_start
    }

    pub fn item_vector_start(&self) -> usize {
        self.item_vector_start
    }

    pub fn user_width(&self) -> usize {
        self.user_features.len()
    }

    pub fn item_width(&self) -> usize {
        self.item_features.len()
    }

    pub fn user_features(&self) -> &[String] {
        &self.user_features
    }

    pub fn item_features(&self) -> &[String] {
        &self.item_features
    }

    /// Number of one-hot genre columns on the item side
    pub fn genre_count(&self) -> usize {
        self.item_features.len() - self.item_vector_start
    }

    /// Genre name for an offset into the item genre block
    pub fn genre_name(&self, offset: usize) -> Option<&str> {
        self.item_features
            .get(self.item_vector_start + offset)
            .map(String::as_str)
    }

    /// User column holding the per-genre average for a genre offset
    pub fn user_genre_column(&self, offset: usize) -> usize {
        self.user_vector_start + offset
    }

    /// Model-input slice of a user matrix
    pub fn user_model_input<'a>(&self, users: ArrayView2<'a, f64>) -> ArrayView2<'a, f64> {
        users.slice_move(s![.., self.user_vector_start..])
    }

    /// Model-input slice of an item matrix
    pub fn item_model_input<'a>(&self, items: ArrayView2<'a, f64>) -> ArrayView2<'a, f64> {
        items.slice_move(s![.., self.item_vector_start..])
    }

    /// Check that a user matrix has this layout's width
    pub fn check_user_width(&self, users: ArrayView2<f64>) -> Result<()> {
        if users.ncols() != self.user_width() {
            return Err(RecsysError::shape(format!(
                "user matrix has {} columns, layout expects {}",
                users.ncols(),
                self.user_width()
            )));
        }
        Ok(())
    }

    /// Check that an item matrix has this layout's width
    pub fn check_item_width(&self, items: ArrayView2<f64>) -> Result<()> {
        if items.ncols() != self.item_width() {
            return Err(RecsysError::shape(format!(
                "item matrix has {} columns, layout expects {}",
                items.ncols(),
                self.item_width()
            )));
        }
        Ok(())
    }

    /// Check a single user row against the layout width
    pub fn check_user_row(&self, user: ArrayView1<f64>) -> Result<()> {
        if user.len() != self.user_width() {
            return Err(RecsysError::shape(format!(
                "user vector has {} features, layout expects {}",
                user.len(),
                self.user_width()
            )));
        }
        Ok(())
    }
}
