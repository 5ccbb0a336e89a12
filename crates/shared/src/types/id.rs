//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SaleId` where an `OrderId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Opaque identifier of the acting user (identity lives elsewhere).");
typed_id!(CategoryId, "Unique identifier for a product category.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(VariantId, "Unique identifier for a sellable product variant.");
typed_id!(SupplierId, "Unique identifier for a supplier.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(StockEntryId, "Unique identifier for a manual stock entry.");
typed_id!(StockMovementId, "Unique identifier for a stock movement audit row.");
typed_id!(OrderId, "Unique identifier for a purchase order.");
typed_id!(OrderItemId, "Unique identifier for a purchase order line.");
typed_id!(SaleId, "Unique identifier for a sale.");
typed_id!(SaleItemId, "Unique identifier for a sale line.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
