//! Sale transaction error types.

use stockbook_shared::AppError;
use stockbook_shared::types::{CustomerId, SaleId};
use thiserror::Error;

use super::types::{SaleStatus, Shortage};
use crate::ledger::LedgerError;

/// Errors that can occur during sale operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// Sale has no items.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// Sale is already completed.
    #[error("Sale has already been completed")]
    AlreadyCompleted,

    /// Sale is already cancelled.
    #[error("Sale has already been cancelled")]
    AlreadyCancelled,

    /// Cancelled sales cannot be completed.
    #[error("Cannot complete a cancelled sale")]
    SaleCancelled,

    /// Stock does not cover the requested quantities.
    #[error("Insufficient stock: {}", join(.0))]
    InsufficientStock(Vec<Shortage>),

    /// One or more sale lines are malformed.
    #[error("Invalid sale items: {}", .0.join("; "))]
    InvalidLine(Vec<String>),

    /// Sale cannot be deleted from its current status.
    #[error("Cannot delete a sale with status {0}")]
    CannotDelete(SaleStatus),

    /// Amount does not fit the currency counter.
    #[error("Sale amount overflows")]
    AmountOverflow,

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Stock ledger rejected a delta.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

fn join(shortages: &[Shortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SaleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySale => "EMPTY_SALE",
            Self::AlreadyCompleted => "ALREADY_COMPLETED",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::SaleCancelled => "SALE_CANCELLED",
            Self::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            Self::InvalidLine(_) => "INVALID_SALE_ITEM",
            Self::CannotDelete(_) => "CANNOT_DELETE_SALE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::SaleNotFound(_) => "SALE_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidLine(_) | Self::AmountOverflow => 400,
            Self::SaleNotFound(_) | Self::CustomerNotFound(_) => 404,
            Self::AlreadyCompleted
            | Self::AlreadyCancelled
            | Self::SaleCancelled
            | Self::CannotDelete(_) => 409,
            Self::EmptySale | Self::InsufficientStock(_) => 422,
            Self::Ledger(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::Ledger(e) => e.into(),
            SaleError::Database(msg) => Self::Database(msg),
            SaleError::SaleNotFound(_) | SaleError::CustomerNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            SaleError::InvalidLine(_) | SaleError::AmountOverflow => {
                Self::Validation(err.to_string())
            }
            _ => Self::rejected(err.error_code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_shared::types::VariantId;

    #[test]
    fn test_insufficient_stock_lists_every_variant() {
        let err = SaleError::InsufficientStock(vec![
            Shortage {
                variant_id: VariantId::new(),
                available: 1,
                requested: 3,
            },
            Shortage {
                variant_id: VariantId::new(),
                available: 0,
                requested: 2,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("available 1, requested 3"));
        assert!(msg.contains("available 0, requested 2"));
    }

    #[test]
    fn test_empty_sale_keeps_code_in_app_error() {
        let app: AppError = SaleError::EmptySale.into();
        assert_eq!(app.error_code(), "EMPTY_SALE");
        assert_eq!(app.status_code(), 422);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SaleError::AlreadyCompleted.status_code(), 409);
        assert_eq!(SaleError::InsufficientStock(vec![]).status_code(), 422);
        assert_eq!(SaleError::SaleNotFound(SaleId::new()).status_code(), 404);
    }
}
