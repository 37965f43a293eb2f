//! Core error type.
//!
//! Higher crates wrap `CoreError` as one variant of their own enums rather than
//! re-declaring these cases.

use thiserror::Error;

/// Errors raised while parsing run parameters, dates and quantities.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported time increment {0:?} (expected \"daily\", \"hourly\" or \"half-hourly\")")]
    UnsupportedTimeIncrement(String),

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("run parameter {name:?}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("quantity {0} is not a whole number")]
    NonIntegralQuantity(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// `true` for errors that describe a bad configuration rather than bad
    /// simulation state.
    pub fn is_config(&self) -> bool {
        !matches!(self, CoreError::NonIntegralQuantity(_))
    }
}

/// Shorthand result type for `sc-core`.
pub type CoreResult<T> = Result<T, CoreError>;
