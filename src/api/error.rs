// ==========================================
// School Infrastructure Compliance DSS - API Error Types
// ==========================================
// Converts repository/engine errors into user-facing messages. Every
// error carries an explicit reason.
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("no data available: {0}")]
    NoData(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("pipeline failure: {0}")]
    Pipeline(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id={}", entity, id))
            }
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoData(msg) => ApiError::NoData(msg),
            other => ApiError::Pipeline(other.to_string()),
        }
    }
}

/// Result alias for the API layer
pub type ApiResult<T> = Result<T, ApiError>;
