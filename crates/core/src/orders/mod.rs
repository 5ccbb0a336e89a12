//! Purchase order fulfillment.
//!
//! Validates new purchase orders, plans deliveries against outstanding
//! quantities, and derives order status from item delivery state.

pub mod error;
pub mod service;
pub mod types;

pub use error::OrderError;
pub use service::FulfillmentService;
pub use types::*;
