//! Catalog and ratings lookups

use crate::error::{RecsysError, Result};
use crate::types::{MovieId, MovieInfo, UserId, UserRatings};
use std::collections::HashMap;

/// Movie display metadata keyed by movie id
#[derive(Debug, Clone, Default)]
pub struct MovieCatalog {
    movies: HashMap<MovieId, MovieInfo>,
}

impl MovieCatalog {
    pub fn new(movies: HashMap<MovieId, MovieInfo>) -> Self {
        Self { movies }
    }

    /// Look up a movie; a miss means the catalog and item vectors disagree.
    pub fn get(&self, movie_id: MovieId) -> Result<&MovieInfo> {
        self.movies
            .get(&movie_id)
            .ok_or(RecsysError::UnknownMovie(movie_id))
    }

    pub fn title(&self, movie_id: MovieId) -> Result<&str> {
        self.get(movie_id).map(|m| m.title.as_str())
    }

    pub fn genres(&self, movie_id: MovieId) -> Result<&str> {
        self.get(movie_id).map(|m| m.genres.as_str())
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

impl FromIterator<(MovieId, MovieInfo)> for MovieCatalog {
    fn from_iter<I: IntoIterator<Item = (MovieId, MovieInfo)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Prior ratings keyed by user id
#[derive(Debug, Clone, Default)]
pub struct RatingsIndex {
    users: HashMap<UserId, UserRatings>,
}

impl RatingsIndex {
    pub fn new(users: HashMap<UserId, UserRatings>) -> Self {
        Self { users }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn get(&self, user_id: UserId) -> Option<&UserRatings> {
        self.users.get(&user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
