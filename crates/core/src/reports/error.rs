//! Report error types.

use chrono::NaiveDate;
use stockbook_shared::AppError;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Low-stock threshold cannot be negative.
    #[error("Invalid low stock threshold: {0}")]
    InvalidThreshold(i32),

    /// An aggregated amount does not fit the currency counter.
    #[error("Report amount is too large: {0}")]
    AmountOverflow(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidThreshold(_) => "INVALID_THRESHOLD",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::InvalidThreshold(_) => 400,
            Self::AmountOverflow(_) => 422,
            Self::Database(_) => 500,
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Database(msg) => Self::Database(msg),
            ReportError::AmountOverflow(_) => Self::rejected(err.error_code(), err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
