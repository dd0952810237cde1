//! Shared identifiers and record types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Movie identifier, stored in column 0 of every item row
pub type MovieId = i64;

/// User identifier, stored in column 0 of every user row
pub type UserId = i64;

/// Display metadata for one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInfo {
    pub title: String,
    pub genres: String,
}

/// Prior ratings and per-genre statistics for one user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRatings {
    /// Ratings keyed by movie id
    pub movies: HashMap<MovieId, f64>,

    /// Average over all of the user's ratings, when exported
    #[serde(default)]
    pub rating_ave: Option<f64>,
}

impl UserRatings {
    pub fn new(movies: HashMap<MovieId, f64>) -> Self {
        Self {
            movies,
            rating_ave: None,
        }
    }

    pub fn rating(&self, movie_id: MovieId) -> Option<f64> {
        self.movies.get(&movie_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ratings_from_json_ignores_unknown_fields() {
        let ratings: UserRatings = serde_json::from_str(
            r#"{"movies": {"10": 5.0, "20": 3.5}, "rating_ave": 4.25, "glist": ["Action"]}"#,
        )
        .unwrap();

        assert_eq!(ratings.rating(10), Some(5.0));
        assert_eq!(ratings.rating(20), Some(3.5));
        assert_eq!(ratings.rating(30), None);
        assert_eq!(ratings.rating_ave, Some(4.25));
    }
}
