//! Dataset loading
//!
//! Reads the fixed set of exported training artifacts from a local
//! directory. Numeric tables are headerless CSV; feature headers hold one
//! name per line; the movie list has a header row keyed by `movieId`; the
//! ratings map is JSON.

use crate::catalog::{MovieCatalog, RatingsIndex};
use crate::error::{RecsysError, Result};
use crate::types::{MovieId, MovieInfo, UserId, UserRatings};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ITEM_TRAIN_FILE: &str = "content_item_train.csv";
pub const USER_TRAIN_FILE: &str = "content_user_train.csv";
pub const Y_TRAIN_FILE: &str = "content_y_train.csv";
pub const ITEM_HEADER_FILE: &str = "content_item_train_header.txt";
pub const USER_HEADER_FILE: &str = "content_user_train_header.txt";
pub const ITEM_VECS_FILE: &str = "content_item_vecs.csv";
pub const MOVIE_LIST_FILE: &str = "content_movie_list.csv";
pub const USER_TO_GENRE_FILE: &str = "content_user_to_genre.json";

/// All artifacts needed to serve recommendations
#[derive(Debug, Clone)]
pub struct ContentDataset {
    pub item_train: Array2<f64>,
    pub user_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub item_features: Vec<String>,
    pub user_features: Vec<String>,
    pub item_vecs: Array2<f64>,
    pub movies: MovieCatalog,
    pub ratings: RatingsIndex,
}

impl ContentDataset {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let start = std::time::Instant::now();

        let dataset = Self {
            item_train: read_matrix(dir.join(ITEM_TRAIN_FILE))?,
            user_train: read_matrix(dir.join(USER_TRAIN_FILE))?,
            y_train: read_vector(dir.join(Y_TRAIN_FILE))?,
            item_features: read_feature_names(dir.join(ITEM_HEADER_FILE))?,
            user_features: read_feature_names(dir.join(USER_HEADER_FILE))?,
            item_vecs: read_matrix(dir.join(ITEM_VECS_FILE))?,
            movies: read_movie_list(dir.join(MOVIE_LIST_FILE))?,
            ratings: read_user_to_genre(dir.join(USER_TO_GENRE_FILE))?,
        };

        tracing::info!(
            "Loaded dataset from {} in {}ms: {} training rows, {} item vectors, {} movies, {} users",
            dir.display(),
            start.elapsed().as_millis(),
            dataset.item_train.nrows(),
            dataset.item_vecs.nrows(),
            dataset.movies.len(),
            dataset.ratings.len()
        );

        Ok(dataset)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn headerless_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Read a headerless numeric CSV into a dense matrix
pub fn read_matrix(path: impl Into<PathBuf>) -> Result<Array2<f64>> {
    let path = path.into();
    let mut reader = headerless_reader(&path)?;

    let mut values = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 {
            cols = record.len();
        }
        for field in record.iter() {
            let value = field.parse::<f64>().map_err(|e| RecsysError::Parse {
                path: display(&path),
                record: index as u64,
                message: format!("'{}': {}", field, e),
            })?;
            values.push(value);
        }
        rows += 1;
    }

    tracing::debug!("Read {} x {} matrix from {}", rows, cols, path.display());
    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

/// Read a single-column numeric CSV, flattened
pub fn read_vector(path: impl Into<PathBuf>) -> Result<Array1<f64>> {
    let matrix = read_matrix(path)?;
    Ok(matrix.iter().copied().collect())
}

/// Read one feature name per line
pub fn read_feature_names(path: impl Into<PathBuf>) -> Result<Vec<String>> {
    let path = path.into();
    let mut reader = headerless_reader(&path)?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(name) = record.get(0) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    genres: String,
}

/// Read the movie list (`movieId,title,genres,...` with a header row)
pub fn read_movie_list(path: impl Into<PathBuf>) -> Result<MovieCatalog> {
    let path = path.into();
    let mut reader = csv::Reader::from_path(&path)?;

    let mut movies = HashMap::new();
    for record in reader.deserialize() {
        let record: MovieRecord = record?;
        movies.insert(
            record.movie_id,
            MovieInfo {
                title: record.title,
                genres: record.genres,
            },
        );
    }
    Ok(MovieCatalog::new(movies))
}

/// Read the user id → ratings map
pub fn read_user_to_genre(path: impl Into<PathBuf>) -> Result<RatingsIndex> {
    let path = path.into();
    let json = std::fs::read_to_string(&path).map_err(|source| RecsysError::Io {
        path: display(&path),
        source,
    })?;
    let users: HashMap<UserId, UserRatings> = serde_json::from_str(&json)?;
    Ok(RatingsIndex::new(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_matrix() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.csv", "1,2.5,3\n4, 5 ,6e-1\n");

        let matrix = read_matrix(path).unwrap();
        assert_eq!(matrix, array![[1.0, 2.5, 3.0], [4.0, 5.0, 0.6]]);
    }

    #[test]
    fn test_read_matrix_rejects_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.csv", "1,2\n3,abc\n");

        let result = read_matrix(path);
        assert!(matches!(result, Err(RecsysError::Parse { record: 1, .. })));
    }

    #[test]
    fn test_read_matrix_rejects_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.csv", "1,2\n3\n");
        assert!(matches!(read_matrix(path), Err(RecsysError::Csv(_))));
    }

    #[test]
    fn test_read_vector_flattens() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "y.csv", "4.5\n3\n0.5\n");
        assert_eq!(read_vector(path).unwrap(), array![4.5, 3.0, 0.5]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_matrix(dir.path().join("absent.csv")).is_err());
        assert!(read_user_to_genre(dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_load_dataset() {
        let dir = TempDir::new().unwrap();
        write(&dir, ITEM_TRAIN_FILE, "10,1995,4.0,1,0\n20,1995,3.0,0,1\n");
        write(&dir, USER_TRAIN_FILE, "7,2,4.5,5.0,4.0\n7,2,4.5,5.0,4.0\n");
        write(&dir, Y_TRAIN_FILE, "5\n4\n");
        write(&dir, ITEM_HEADER_FILE, "movie id\nyear\nave rating\nAction\nDrama\n");
        write(&dir, USER_HEADER_FILE, "user id\nrating count\nrating ave\nAction\nDrama\n");
        write(&dir, ITEM_VECS_FILE, "10,1995,4.0,1,0\n20,1995,3.0,0,1\n");
        write(
            &dir,
            MOVIE_LIST_FILE,
            "movieId,title,genres\n10,Heat (1995),Action|Crime\n20,\"Casino, The (1995)\",Crime|Drama\n",
        );
        write(
            &dir,
            USER_TO_GENRE_FILE,
            r#"{"7": {"movies": {"10": 5.0, "20": 4.0}, "rating_ave": 4.5}}"#,
        );

        let dataset = ContentDataset::load(dir.path()).unwrap();

        assert_eq!(dataset.item_train.shape(), &[2, 5]);
        assert_eq!(dataset.user_train.shape(), &[2, 5]);
        assert_eq!(dataset.y_train, array![5.0, 4.0]);
        assert_eq!(dataset.item_features[3], "Action");
        assert_eq!(dataset.user_features.len(), 5);
        assert_eq!(dataset.movies.title(20).unwrap(), "Casino, The (1995)");
        assert_eq!(dataset.ratings.get(7).and_then(|r| r.rating(10)), Some(5.0));
    }
}
