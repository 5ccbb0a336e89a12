//! Role-based capabilities for request handlers.
//!
//! Handlers resolve the caller's [`Permissions`] once and check the
//! capability an operation needs before calling a repository. The ledger,
//! fulfillment and sale services never see permissions.

pub mod error;
pub mod permissions;

pub use error::AccessError;
pub use permissions::{Capability, Permissions, Role};
