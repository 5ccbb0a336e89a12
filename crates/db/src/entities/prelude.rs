//! `SeaORM` entity prelude.

pub use super::categories::Entity as Categories;
pub use super::customers::Entity as Customers;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::product_variants::Entity as ProductVariants;
pub use super::products::Entity as Products;
pub use super::sale_items::Entity as SaleItems;
pub use super::sales::Entity as Sales;
pub use super::stock_entries::Entity as StockEntries;
pub use super::stock_movements::Entity as StockMovements;
pub use super::suppliers::Entity as Suppliers;
