// ==========================================
// School Infrastructure Compliance DSS - Importer Error Types
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Fact importer errors
#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: &'static str },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result alias for the importer layer
pub type ImporterResult<T> = Result<T, ImporterError>;
