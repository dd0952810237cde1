use actix_web::{HttpResponse, ResponseError};

use crate::types::{MovieId, UserId};

pub type Result<T> = std::result::Result<T, RecsysError>;

#[derive(Debug, thiserror::Error)]
pub enum RecsysError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid feature layout: {0}")]
    InvalidLayout(String),

    #[error("User {0} has ratings but no training feature row")]
    InconsistentUser(UserId),

    #[error("Movie {0} not found in catalog")]
    UnknownMovie(MovieId),

    #[error("Item row for movie {0} has no genre indicator set")]
    MissingGenre(MovieId),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Scaler error: {0}")]
    Scaler(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path} at record {record}: {message}")]
    Parse {
        path: String,
        record: u64,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecsysError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        RecsysError::ShapeMismatch(message.into())
    }
}

impl From<ndarray::ShapeError> for RecsysError {
    fn from(err: ndarray::ShapeError) -> Self {
        RecsysError::ShapeMismatch(err.to_string())
    }
}

impl ResponseError for RecsysError {
    fn error_response(&self) -> HttpResponse {
        match self {
            RecsysError::ShapeMismatch(_) | RecsysError::InvalidLayout(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "invalid_request",
                    "error_description": self.to_string()
                }))
            }
            RecsysError::InconsistentUser(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "inconsistent_user",
                    "error_description": self.to_string()
                }))
            }
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "error_description": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_shape_errors_are_bad_requests() {
        let err = RecsysError::shape("user rows 3 != item rows 2");
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_inconsistent_user_is_server_error() {
        let err = RecsysError::InconsistentUser(7);
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(err.to_string().contains('7'));
    }
}
