//! Core business logic for Stockbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories in `stockbook-db` load and lock rows, ask these services to
//! validate and plan a change, then persist the plan.
//!
//! # Modules
//!
//! - `ledger` - Stock counter arithmetic, entry normalization, movement replay
//! - `orders` - Purchase order validation and delivery planning
//! - `sales` - Sale pricing, completion and cancellation
//! - `reports` - Inventory and sales report aggregation
//! - `access` - Role to capability mapping for handlers

pub mod access;
pub mod ledger;
pub mod orders;
pub mod reports;
pub mod sales;
