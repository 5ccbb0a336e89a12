//! `SeaORM` active enums, stored as upper-case strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockbook_core::{ledger, orders, sales};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum CategoryType {
    #[sea_orm(string_value = "FURNITURE")]
    Furniture,
    #[sea_orm(string_value = "WOOD")]
    Wood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum StockEntryType {
    #[sea_orm(string_value = "ADDITION")]
    Addition,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "DAMAGE")]
    Damage,
    #[sea_orm(string_value = "RETURN")]
    Return,
    #[sea_orm(string_value = "CORRECTION")]
    Correction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum MovementType {
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "ORDER")]
    Order,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "RETURN")]
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PARTIAL")]
    Partial,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum SaleStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "MOBILE_MONEY")]
    MobileMoney,
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    #[sea_orm(string_value = "CARD")]
    Card,
}

/// Maps a column enum to its core counterpart and back.
macro_rules! map_enum {
    ($db:ident <=> $core:path { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $(<$core>::$variant => Self::$variant,)+
                }
            }
        }
    };
}

map_enum!(StockEntryType <=> ledger::EntryType {
    Addition,
    Adjustment,
    Damage,
    Return,
    Correction,
});
map_enum!(MovementType <=> ledger::MovementType { Sale, Order, Adjustment, Return });
map_enum!(OrderStatus <=> orders::OrderStatus { Pending, Partial, Delivered, Cancelled });
map_enum!(SaleStatus <=> sales::SaleStatus { Pending, Completed, Cancelled });
map_enum!(PaymentMethod <=> sales::PaymentMethod { Cash, MobileMoney, BankTransfer, Card });

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveEnum, Iterable};

    #[test]
    fn test_string_values_match_core() {
        for status in OrderStatus::iter() {
            let core: orders::OrderStatus = status.into();
            assert_eq!(status.to_value(), core.as_str());
            assert_eq!(OrderStatus::from(core), status);
        }
        for method in PaymentMethod::iter() {
            let core: sales::PaymentMethod = method.into();
            assert_eq!(method.to_value(), core.as_str());
        }
        for entry in StockEntryType::iter() {
            let core: ledger::EntryType = entry.into();
            assert_eq!(entry.to_value(), core.as_str());
        }
        for movement in MovementType::iter() {
            let core: ledger::MovementType = movement.into();
            assert_eq!(movement.to_value(), core.as_str());
        }
        for status in SaleStatus::iter() {
            let core: sales::SaleStatus = status.into();
            assert_eq!(status.to_value(), core.as_str());
        }
    }
}
