//! Backend error types for Docshare persistence.
//!
//! This module defines structured error types for credential store and file
//! registry operations. Domain outcomes such as a taken username are reported
//! through the user module's errors instead; these cover storage failures.

use thiserror::Error;

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// A stored row could not be turned back into a domain value.
    #[error("Invalid stored record in {table}: {reason}")]
    InvalidRecord {
        /// The table or collection holding the record
        table: &'static str,
        /// Description of what was wrong
        reason: String,
    },

    /// Backend configuration is incomplete or inconsistent.
    #[error("Backend configuration error: {reason}")]
    Configuration {
        /// Description of the configuration problem
        reason: String,
    },

    /// Database query or connection failure.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context for the failure
        reason: String,
        /// The underlying sqlx error, if any
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates corrupt or unexpected stored data.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::InvalidRecord { .. })
    }

    /// Check if this error comes from configuration rather than runtime state.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, BackendError::Configuration { .. })
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
