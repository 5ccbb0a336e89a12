//! Roles, capabilities and the role to capability map.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::AccessError;

/// Staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access.
    Manager,
    /// Front-of-shop staff recording sales.
    Sales,
    /// Warehouse staff handling stock and deliveries.
    Inventory,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MANAGER" => Some(Self::Manager),
            "SALES" => Some(Self::Sales),
            "INVENTORY" => Some(Self::Inventory),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Sales => "SALES",
            Self::Inventory => "INVENTORY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named permission a handler checks before calling into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create manual stock entries.
    RecordStockEntry,
    /// View stock levels, entries and movements.
    ViewInventory,
    /// Create, cancel and list purchase orders.
    ManageOrders,
    /// Record deliveries against purchase orders.
    ReceiveDeliveries,
    /// Record new sales.
    RecordSales,
    /// Complete pending sales.
    CompleteSales,
    /// Cancel sales.
    CancelSales,
    /// Delete orders and sales.
    DeleteRecords,
    /// Maintain categories, products, variants, suppliers and customers.
    ManageCatalog,
    /// Run inventory and sales reports.
    ViewReports,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Self; 10] = [
        Self::RecordStockEntry,
        Self::ViewInventory,
        Self::ManageOrders,
        Self::ReceiveDeliveries,
        Self::RecordSales,
        Self::CompleteSales,
        Self::CancelSales,
        Self::DeleteRecords,
        Self::ManageCatalog,
        Self::ViewReports,
    ];

    /// Returns the string representation of the capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordStockEntry => "record_stock_entry",
            Self::ViewInventory => "view_inventory",
            Self::ManageOrders => "manage_orders",
            Self::ReceiveDeliveries => "receive_deliveries",
            Self::RecordSales => "record_sales",
            Self::CompleteSales => "complete_sales",
            Self::CancelSales => "cancel_sales",
            Self::DeleteRecords => "delete_records",
            Self::ManageCatalog => "manage_catalog",
            Self::ViewReports => "view_reports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities granted to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    role: Role,
}

impl Permissions {
    /// Permissions of a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        Self { role }
    }

    /// The caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// True if the role grants `capability`.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match self.role {
            Role::Manager => true,
            Role::Inventory => matches!(
                capability,
                Capability::RecordStockEntry
                    | Capability::ViewInventory
                    | Capability::ReceiveDeliveries
                    | Capability::ManageCatalog
            ),
            Role::Sales => matches!(
                capability,
                Capability::RecordSales | Capability::CompleteSales | Capability::ViewInventory
            ),
        }
    }

    /// Checks a capability.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` if the role lacks `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), AccessError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(AccessError::AccessDenied {
                role: self.role,
                capability,
            })
        }
    }

    /// Every capability the role grants.
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stockbook_shared::AppError;

    #[test]
    fn test_manager_has_everything() {
        let perms = Permissions::for_role(Role::Manager);
        assert_eq!(perms.capabilities().count(), Capability::ALL.len());
    }

    #[rstest]
    #[case(Role::Inventory, Capability::RecordStockEntry, true)]
    #[case(Role::Inventory, Capability::ReceiveDeliveries, true)]
    #[case(Role::Inventory, Capability::ManageCatalog, true)]
    #[case(Role::Inventory, Capability::RecordSales, false)]
    #[case(Role::Inventory, Capability::DeleteRecords, false)]
    #[case(Role::Sales, Capability::RecordSales, true)]
    #[case(Role::Sales, Capability::CompleteSales, true)]
    #[case(Role::Sales, Capability::ViewInventory, true)]
    #[case(Role::Sales, Capability::CancelSales, false)]
    #[case(Role::Sales, Capability::ReceiveDeliveries, false)]
    #[case(Role::Sales, Capability::ViewReports, false)]
    fn test_role_capabilities(
        #[case] role: Role,
        #[case] capability: Capability,
        #[case] allowed: bool,
    ) {
        assert_eq!(Permissions::for_role(role).allows(capability), allowed);
    }

    #[test]
    fn test_require_denies_with_context() {
        let err = Permissions::for_role(Role::Sales)
            .require(Capability::CancelSales)
            .unwrap_err();
        assert_eq!(err.to_string(), "Role SALES is not allowed to cancel_sales");

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 403);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("Inventory"), Some(Role::Inventory));
        assert_eq!(Role::parse("admin"), None);
    }
}
