//! Ledger error types.

use stockbook_shared::AppError;
use stockbook_shared::types::VariantId;
use thiserror::Error;

/// Errors that can occur while mutating a variant's stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Debit would take the counter below zero.
    #[error("Insufficient stock for variant {variant_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The variant being debited.
        variant_id: VariantId,
        /// Stock on hand before the debit.
        available: i32,
        /// Units the caller tried to remove.
        requested: i32,
    },

    /// Zero delta, or a delta that overflows the counter.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Variant does not exist.
    #[error("Product variant not found: {0}")]
    VariantNotFound(VariantId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::VariantNotFound(_) => "VARIANT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidQuantity(_) => 400,
            Self::VariantNotFound(_) => 404,
            Self::InsufficientStock { .. } => 422,
            Self::Database(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuantity(_) => Self::Validation(err.to_string()),
            LedgerError::VariantNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::InsufficientStock { .. } => {
                Self::rejected(err.error_code(), err.to_string())
            }
            LedgerError::Database(msg) => Self::Database(msg),
        }
    }
}
