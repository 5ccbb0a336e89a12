//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every write of a variant's stock counter goes through [`stock::apply_delta`].

pub mod catalog;
pub mod order;
pub mod report;
pub mod sale;
pub mod stock;

pub use catalog::{
    CatalogError, CatalogRepository, CreateCategoryInput, CreateCustomerInput, CreateProductInput,
    CreateSupplierInput, CreateVariantInput, DEFAULT_REORDER_LEVEL,
};
pub use order::{CreateOrderInput, OrderFilter, OrderRepository, OrderWithItems};
pub use report::ReportRepository;
pub use sale::{CreateSaleInput, CustomerPurchaseStats, SaleFilter, SaleRepository, SaleWithItems};
pub use stock::{
    CreateStockEntryInput, MovementFilter, MovementInput, StockEntryFilter, StockEntryWithMovement,
    StockRepository,
};
