//! Unified error types for the demand metrics workspace
//!
//! [`EdmError`] covers loading, schema checks and metric computation so that
//! every crate can surface failures the same way. The CLI decides which of
//! them abort a run and which only omit a single metric.
//!
//! # Example
//!
//! ```ignore
//! use edm_core::{EdmError, EdmResult};
//!
//! fn demand_cagr(first: f64, last: f64, periods: u32) -> EdmResult<f64> {
//!     if first == 0.0 {
//!         return Err(EdmError::DivisionByZero("demand CAGR".into()));
//!     }
//!     Ok(((last / first).powf(1.0 / periods as f64) - 1.0) * 100.0)
//! }
//! ```

use polars::prelude::PolarsError;
use thiserror::Error;

/// Unified error type for all demand metrics operations.
#[derive(Error, Debug)]
pub enum EdmError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame backend errors
    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),

    /// The source file for a dataset does not exist
    #[error("Source for dataset '{dataset}' not found: {path}")]
    MissingSource { dataset: String, path: String },

    /// A dataset lacks a column the analysis depends on
    #[error("Dataset '{dataset}' is missing expected column '{column}'")]
    MissingColumn { dataset: String, column: String },

    /// A dataset needed by an analysis step was never loaded
    #[error("Dataset '{0}' is not available")]
    Unavailable(String),

    /// Division by zero while computing a named metric
    #[error("Calculation error: division by zero in metric '{0}'")]
    DivisionByZero(String),

    /// Too few observations for the requested metric
    #[error("Not enough data for '{metric}': need at least {needed}, found {found}")]
    InsufficientData {
        metric: String,
        needed: usize,
        found: usize,
    },

    /// Periods are not strictly increasing
    #[error("Dataset '{dataset}' is not in chronological order on '{column}' (row {row})")]
    NotChronological {
        dataset: String,
        column: String,
        row: usize,
    },

    /// A grouping key occurs more than once where it must be unique
    #[error("Dataset '{dataset}' has duplicate key '{key}'")]
    DuplicateKey { dataset: String, key: String },

    /// Numeric result is undefined (NaN, infinite, negative base)
    #[error("Computation error: {0}")]
    Computation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using EdmError.
pub type EdmResult<T> = Result<T, EdmError>;

impl EdmError {
    /// True for failures that only make one metric unavailable.
    ///
    /// Schema and I/O problems are not recoverable this way.
    pub fn is_metric_local(&self) -> bool {
        matches!(
            self,
            EdmError::DivisionByZero(_)
                | EdmError::InsufficientData { .. }
                | EdmError::Computation(_)
                | EdmError::Unavailable(_)
        )
    }
}

impl From<anyhow::Error> for EdmError {
    fn from(err: anyhow::Error) -> Self {
        EdmError::Other(err.to_string())
    }
}

impl From<String> for EdmError {
    fn from(s: String) -> Self {
        EdmError::Other(s)
    }
}

impl From<&str> for EdmError {
    fn from(s: &str) -> Self {
        EdmError::Other(s.to_string())
    }
}
