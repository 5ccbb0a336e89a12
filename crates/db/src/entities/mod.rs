//! `SeaORM` entities.

pub mod prelude;

pub mod categories;
pub mod customers;
pub mod order_items;
pub mod orders;
pub mod product_variants;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod stock_entries;
pub mod stock_movements;
pub mod suppliers;
