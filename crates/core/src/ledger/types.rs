//! Stock ledger domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use stockbook_shared::types::{OrderId, SaleId, StockEntryId};

use super::error::LedgerError;

/// Cause of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Units sold on sale completion.
    Sale,
    /// Units received from a purchase order delivery.
    Order,
    /// Manual stock entry.
    Adjustment,
    /// Units returned to stock (returned goods or a cancelled sale).
    Return,
}

impl MovementType {
    /// Returns the string representation of the movement type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Order => "ORDER",
            Self::Adjustment => "ADJUSTMENT",
            Self::Return => "RETURN",
        }
    }

    /// Parses a movement type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SALE" => Some(Self::Sale),
            "ORDER" => Some(Self::Order),
            "ADJUSTMENT" => Some(Self::Adjustment),
            "RETURN" => Some(Self::Return),
            _ => None,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of manual stock entry.
///
/// The kind decides the sign of the stored quantity:
/// - `Damage` is always a removal
/// - `Addition` and `Return` are always additions
/// - `Adjustment` and `Correction` keep the caller's sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// New stock arriving outside a purchase order.
    Addition,
    /// Manual count adjustment.
    Adjustment,
    /// Damaged goods written off.
    Damage,
    /// Goods returned by a customer.
    Return,
    /// Correction of an earlier mistake.
    Correction,
}

impl EntryType {
    /// Returns the string representation of the entry type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "ADDITION",
            Self::Adjustment => "ADJUSTMENT",
            Self::Damage => "DAMAGE",
            Self::Return => "RETURN",
            Self::Correction => "CORRECTION",
        }
    }

    /// Parses an entry type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADDITION" => Some(Self::Addition),
            "ADJUSTMENT" => Some(Self::Adjustment),
            "DAMAGE" => Some(Self::Damage),
            "RETURN" => Some(Self::Return),
            "CORRECTION" => Some(Self::Correction),
            _ => None,
        }
    }

    /// Normalizes a caller-supplied quantity to the signed delta stored on the entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for zero, or for `i32::MIN` whose magnitude
    /// does not fit the counter.
    pub fn normalize(self, quantity: i32) -> Result<i32, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity(
                "stock entry quantity cannot be zero".to_string(),
            ));
        }
        let magnitude = quantity.checked_abs().ok_or_else(|| {
            LedgerError::InvalidQuantity(format!("stock entry quantity {quantity} is out of range"))
        })?;

        Ok(match self {
            Self::Damage => -magnitude,
            Self::Addition | Self::Return => magnitude,
            Self::Adjustment | Self::Correction => quantity,
        })
    }

    /// Movement type logged when this entry is applied.
    #[must_use]
    pub fn movement_type(self) -> MovementType {
        match self {
            Self::Return => MovementType::Return,
            _ => MovementType::Adjustment,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record that caused a movement, rendered into the movement's reference id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementReference {
    /// Sale completion: `SALE-<id>`.
    Sale(SaleId),
    /// Sale cancellation restoring stock: `SALE-<id>-CANCEL`.
    SaleCancel(SaleId),
    /// Purchase order delivery: `ORDER-<id>`.
    Order(OrderId),
    /// Manual stock entry: `ENTRY-<id>`.
    Entry(StockEntryId),
}

impl fmt::Display for MovementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale(id) => write!(f, "SALE-{id}"),
            Self::SaleCancel(id) => write!(f, "SALE-{id}-CANCEL"),
            Self::Order(id) => write!(f, "ORDER-{id}"),
            Self::Entry(id) => write!(f, "ENTRY-{id}"),
        }
    }
}

/// Before/after snapshot of one counter mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// Stock before the delta.
    pub previous_stock: i32,
    /// Signed delta.
    pub quantity: i32,
    /// Stock after the delta.
    pub new_stock: i32,
}

/// First movement row that does not chain onto the rows before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Position of the row in the replayed slice.
    pub index: usize,
    /// Stock the replay expected the row to start from.
    pub expected_previous: i32,
    /// The offending row.
    pub recorded: StockChange,
}

/// Outcome of replaying a variant's movement log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    /// Counter value rebuilt from the consistent prefix of the log.
    pub final_stock: i32,
    /// Rows applied before the replay stopped.
    pub applied: usize,
    /// First inconsistent row, if any.
    pub mismatch: Option<ReplayMismatch>,
}

impl ReplayReport {
    /// True when every row chained and the result matches `authoritative`.
    #[must_use]
    pub fn matches(&self, authoritative: i32) -> bool {
        self.mismatch.is_none() && self.final_stock == authoritative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(EntryType::Damage, 3, -3)]
    #[case(EntryType::Damage, -3, -3)]
    #[case(EntryType::Addition, -7, 7)]
    #[case(EntryType::Return, -2, 2)]
    #[case(EntryType::Adjustment, -4, -4)]
    #[case(EntryType::Correction, 6, 6)]
    fn test_normalize(#[case] entry_type: EntryType, #[case] input: i32, #[case] expected: i32) {
        assert_eq!(entry_type.normalize(input).unwrap(), expected);
    }

    #[rstest]
    #[case(EntryType::Addition)]
    #[case(EntryType::Damage)]
    #[case(EntryType::Correction)]
    fn test_normalize_zero_rejected(#[case] entry_type: EntryType) {
        assert!(matches!(
            entry_type.normalize(0),
            Err(LedgerError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_normalize_min_value_rejected() {
        assert!(EntryType::Damage.normalize(i32::MIN).is_err());
        assert_eq!(EntryType::Adjustment.normalize(i32::MIN + 1).unwrap(), i32::MIN + 1);
    }

    #[test]
    fn test_entry_movement_type() {
        assert_eq!(EntryType::Return.movement_type(), MovementType::Return);
        assert_eq!(EntryType::Damage.movement_type(), MovementType::Adjustment);
        assert_eq!(EntryType::Addition.movement_type(), MovementType::Adjustment);
    }

    #[test]
    fn test_parse_round_trip() {
        for t in [
            EntryType::Addition,
            EntryType::Adjustment,
            EntryType::Damage,
            EntryType::Return,
            EntryType::Correction,
        ] {
            assert_eq!(EntryType::parse(t.as_str()), Some(t));
        }
        assert_eq!(MovementType::parse("sale"), Some(MovementType::Sale));
        assert_eq!(MovementType::parse("transfer"), None);
    }

    #[test]
    fn test_reference_formats() {
        let id = Uuid::from_u128(7);
        assert_eq!(
            MovementReference::Sale(SaleId::from_uuid(id)).to_string(),
            format!("SALE-{id}")
        );
        assert_eq!(
            MovementReference::SaleCancel(SaleId::from_uuid(id)).to_string(),
            format!("SALE-{id}-CANCEL")
        );
        assert_eq!(
            MovementReference::Order(OrderId::from_uuid(id)).to_string(),
            format!("ORDER-{id}")
        );
        assert_eq!(
            MovementReference::Entry(StockEntryId::from_uuid(id)).to_string(),
            format!("ENTRY-{id}")
        );
    }
}
