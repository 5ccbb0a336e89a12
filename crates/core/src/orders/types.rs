//! Purchase order domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use stockbook_shared::types::{OrderItemId, VariantId};

/// Purchase order status.
///
/// Status follows item delivery state:
/// - Pending: nothing received yet
/// - Partial: some units received
/// - Delivered: every item fully received (terminal)
/// - Cancelled: closed by a manager (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting delivery.
    Pending,
    /// Partially delivered.
    Partial,
    /// Fully delivered.
    Delivered,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Partial => "PARTIAL",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PARTIAL" => Some(Self::Partial),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// True while the order still expects goods.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Partial)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line of a purchase order being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    /// Ordered variant.
    pub variant_id: VariantId,
    /// Units ordered.
    pub quantity: i32,
    /// Unit cost in the smallest currency unit.
    pub unit_price: i64,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Delivery state of an existing order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// The order item.
    pub item_id: OrderItemId,
    /// Ordered variant.
    pub variant_id: VariantId,
    /// Units ordered.
    pub quantity: i32,
    /// Units received so far.
    pub delivered_quantity: i32,
    /// Unit cost in the smallest currency unit.
    pub unit_price: i64,
}

impl OrderLine {
    /// Units still outstanding.
    #[must_use]
    pub fn remaining(&self) -> i32 {
        (self.quantity - self.delivered_quantity).max(0)
    }

    /// True once every ordered unit has been received.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivered_quantity >= self.quantity
    }

    /// Ordered quantity times unit price, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Quantity received for one order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDelivery {
    /// The order item.
    pub item_id: OrderItemId,
    /// Units received in this delivery.
    pub quantity: i32,
}

/// Accepted receipt for one order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemReceipt {
    /// The order item.
    pub item_id: OrderItemId,
    /// Variant credited.
    pub variant_id: VariantId,
    /// Units received now (always positive).
    pub quantity: i32,
    /// Delivered quantity after this receipt.
    pub delivered_quantity: i32,
    /// Whether the item is now fully delivered.
    pub is_delivered: bool,
}

/// Validated delivery ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPlan {
    /// Receipts in ascending variant order (lock order).
    pub receipts: Vec<ItemReceipt>,
    /// Order status once the receipts are applied.
    pub new_status: OrderStatus,
}

/// Item that a delivery would over-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverDeliveryLine {
    /// The order item.
    pub item_id: OrderItemId,
    /// Ordered variant.
    pub variant_id: VariantId,
    /// Units ordered.
    pub ordered: i32,
    /// Units received before this delivery.
    pub already_delivered: i32,
    /// Units in this delivery.
    pub requested: i32,
}

impl OverDeliveryLine {
    /// Units still outstanding.
    #[must_use]
    pub fn remaining(&self) -> i32 {
        (self.ordered - self.already_delivered).max(0)
    }
}

impl fmt::Display for OverDeliveryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "item {} requested {}, remaining {}",
            self.item_id,
            self.requested,
            self.remaining()
        )
    }
}
