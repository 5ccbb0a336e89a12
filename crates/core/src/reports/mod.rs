//! Inventory and sales reports.
//!
//! This module aggregates pre-loaded rows into report values:
//! - Inventory Report (totals, low stock, out of stock, stock by category)
//! - Sales Report (count, revenue, average sale, top products)
//!
//! Rendering to CSV, PDF or spreadsheets is left to the caller.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::{DEFAULT_LOW_STOCK_THRESHOLD, ReportService, TOP_PRODUCTS_LIMIT};
pub use types::*;
