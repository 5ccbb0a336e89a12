//! Order fulfillment error types.

use stockbook_shared::AppError;
use stockbook_shared::types::{OrderId, OrderItemId, SupplierId};
use thiserror::Error;

use super::types::{OrderStatus, OverDeliveryLine};
use crate::ledger::LedgerError;

/// Errors that can occur during purchase order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// One or more items would receive more than remains outstanding.
    #[error("Delivery exceeds ordered quantity: {}", join(.0))]
    OverDelivery(Vec<OverDeliveryLine>),

    /// Order is already fully delivered.
    #[error("Order has already been fully delivered")]
    AlreadyDelivered,

    /// Order was cancelled.
    #[error("Order has been cancelled")]
    OrderCancelled,

    /// Delivery request carried no positive quantity.
    #[error("Delivery contains no items to receive")]
    NothingToDeliver,

    /// Delivery references an item of another order.
    #[error("Item {0} does not belong to this order")]
    ItemNotInOrder(OrderItemId),

    /// Order has no items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// One or more order lines are malformed.
    #[error("Invalid order items: {}", .0.join("; "))]
    InvalidLine(Vec<String>),

    /// Order amount does not fit the currency counter.
    #[error("Order amount is too large")]
    AmountOverflow,

    /// Order cannot be cancelled from its current status.
    #[error("Cannot cancel an order with status {0}")]
    CannotCancel(OrderStatus),

    /// Order cannot be deleted from its current status.
    #[error("Cannot delete an order with status {0}")]
    CannotDelete(OrderStatus),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(SupplierId),

    /// Stock ledger rejected a delta.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

fn join(lines: &[OverDeliveryLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OrderError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OverDelivery(_) => "OVER_DELIVERY",
            Self::AlreadyDelivered => "ALREADY_DELIVERED",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::NothingToDeliver => "NOTHING_TO_DELIVER",
            Self::ItemNotInOrder(_) => "ITEM_NOT_IN_ORDER",
            Self::EmptyOrder => "EMPTY_ORDER",
            Self::InvalidLine(_) => "INVALID_ORDER_ITEM",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::CannotCancel(_) => "CANNOT_CANCEL_ORDER",
            Self::CannotDelete(_) => "CANNOT_DELETE_ORDER",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NothingToDeliver
            | Self::ItemNotInOrder(_)
            | Self::EmptyOrder
            | Self::InvalidLine(_)
            | Self::AmountOverflow => 400,
            Self::OrderNotFound(_) | Self::SupplierNotFound(_) => 404,
            Self::AlreadyDelivered
            | Self::OrderCancelled
            | Self::CannotCancel(_)
            | Self::CannotDelete(_) => 409,
            Self::OverDelivery(_) => 422,
            Self::Ledger(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Ledger(e) => e.into(),
            OrderError::Database(msg) => Self::Database(msg),
            OrderError::OrderNotFound(_) | OrderError::SupplierNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            OrderError::NothingToDeliver
            | OrderError::ItemNotInOrder(_)
            | OrderError::EmptyOrder
            | OrderError::InvalidLine(_)
            | OrderError::AmountOverflow => Self::Validation(err.to_string()),
            _ => Self::rejected(err.error_code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_shared::types::VariantId;

    #[test]
    fn test_over_delivery_lists_every_item() {
        let line = |ordered, delivered, requested| OverDeliveryLine {
            item_id: OrderItemId::new(),
            variant_id: VariantId::new(),
            ordered,
            already_delivered: delivered,
            requested,
        };
        let err = OrderError::OverDelivery(vec![line(10, 4, 7), line(3, 0, 5)]);
        let msg = err.to_string();
        assert!(msg.contains("requested 7, remaining 6"));
        assert!(msg.contains("requested 5, remaining 3"));
        assert_eq!(err.error_code(), "OVER_DELIVERY");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderError::AlreadyDelivered.status_code(), 409);
        assert_eq!(OrderError::EmptyOrder.status_code(), 400);
        assert_eq!(OrderError::OrderNotFound(OrderId::new()).status_code(), 404);
        assert_eq!(
            OrderError::Ledger(LedgerError::InvalidQuantity("zero".into())).status_code(),
            400
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = OrderError::AlreadyDelivered.into();
        assert_eq!(app.error_code(), "ALREADY_DELIVERED");
        assert_eq!(app.to_string(), "Order has already been fully delivered");

        let app: AppError = OrderError::NothingToDeliver.into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = OrderError::Database("gone".into()).into();
        assert!(!app.is_client_error());
    }
}
