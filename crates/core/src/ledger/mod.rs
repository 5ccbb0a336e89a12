//! Stock ledger logic.
//!
//! This module owns the stock-quantity bookkeeping for product variants:
//! - Delta application with the non-negative stock invariant
//! - Stock-entry quantity normalization by entry type
//! - Movement references and audit snapshots
//! - Movement log replay
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::StockLedger;
pub use types::{
    EntryType, MovementReference, MovementType, ReplayMismatch, ReplayReport, StockChange,
};
