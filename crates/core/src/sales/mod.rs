//! Sale transactions.
//!
//! Line pricing with per-item discounts and the delivery surcharge, plus the
//! completion and cancellation plans that debit or restore stock.

pub mod error;
pub mod pricing;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::SaleError;
pub use pricing::{
    DELIVERY_FEE_RATE, LineAmounts, SaleTotals, delivery_fee, line_amounts, sale_totals,
};
pub use service::SaleService;
pub use types::*;
