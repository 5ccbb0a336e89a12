//! Access error types.

use stockbook_shared::AppError;
use thiserror::Error;

use super::permissions::{Capability, Role};

/// Errors raised by capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Role lacks the capability.
    #[error("Role {role} is not allowed to {capability}")]
    AccessDenied {
        /// Caller's role.
        role: Role,
        /// Missing capability.
        capability: Capability,
    },
}

impl AccessError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "ACCESS_DENIED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        403
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        Self::Forbidden(err.to_string())
    }
}
