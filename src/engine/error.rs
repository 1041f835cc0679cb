// ==========================================
// School Infrastructure Compliance DSS - Engine Error Types
// ==========================================
// Missing counterpart fact rows are NOT errors (left-join semantics,
// absent capacity counts as zero). Errors here are programmer-visible
// precondition failures and propagated storage failures.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Engine / pipeline errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A stage ran before its dependency populated the columns it
    /// reads. Fail fast instead of computing against nulls.
    #[error("stage ordering violation: {stage} for {academic_year} requires {missing}")]
    StageOrderingViolation {
        stage: &'static str,
        academic_year: String,
        missing: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no fact data available: {0}")]
    NoData(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result alias for the engine layer
pub type EngineResult<T> = Result<T, EngineError>;
