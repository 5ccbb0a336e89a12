//! Sale domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use stockbook_shared::types::VariantId;

/// Sale status.
///
/// Valid transitions:
/// - Pending → Completed (complete, debits stock)
/// - Pending → Cancelled (cancel, no stock movement)
/// - Completed → Cancelled (cancel, restores stock)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Recorded but not yet completed.
    Pending,
    /// Completed; stock has been debited.
    Completed,
    /// Cancelled.
    Cancelled,
}

impl SaleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Mobile money transfer.
    MobileMoney,
    /// Bank transfer.
    BankTransfer,
    /// Card.
    Card,
}

impl PaymentMethod {
    /// Returns the string representation of the payment method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::MobileMoney => "MOBILE_MONEY",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Card => "CARD",
        }
    }

    /// Parses a payment method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "MOBILE_MONEY" => Some(Self::MobileMoney),
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            "CARD" => Some(Self::Card),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line of a sale being recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleLine {
    /// Sold variant.
    pub variant_id: VariantId,
    /// Units sold.
    pub quantity: i32,
    /// Unit price; the variant's current price when omitted.
    #[serde(default)]
    pub unit_price: Option<i64>,
    /// Discount percentage with two decimal places, in `[0, 100)`.
    #[serde(default)]
    pub discount_percentage: Decimal,
}

/// Priced sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    /// Sold variant.
    pub variant_id: VariantId,
    /// Units sold.
    pub quantity: i32,
    /// Unit price in the smallest currency unit.
    pub unit_price: i64,
    /// Discount percentage.
    pub discount_percentage: Decimal,
}

/// Stock a sale needs that is not on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortage {
    /// The variant.
    pub variant_id: VariantId,
    /// Units on hand.
    pub available: i32,
    /// Units the sale needs across all its lines.
    pub requested: i64,
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variant {} available {}, requested {}",
            self.variant_id, self.available, self.requested
        )
    }
}

/// One stock delta a sale transition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    /// The variant.
    pub variant_id: VariantId,
    /// Signed delta (negative on completion, positive on cancellation).
    pub delta: i32,
}

/// Validated completion ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPlan {
    /// One debit per line, in ascending variant order (lock order).
    pub debits: Vec<StockDelta>,
    /// Recomputed delivery fee.
    pub delivery_fee: i64,
}

/// Validated cancellation ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationPlan {
    /// One credit per line when the sale was completed, else empty.
    pub restorations: Vec<StockDelta>,
}
