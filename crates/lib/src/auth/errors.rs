//! Authentication error types for Docshare.
//!
//! These are the failures of the Authenticator, the Session Gate and the Role
//! Gate once they are turned into errors, e.g. through [`Access::into_result`].
//!
//! [`Access::into_result`]: super::Access::into_result

use thiserror::Error as ThisError;

use crate::Error;
use crate::user::Role;

/// Errors that can occur during authentication operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// Username and password did not match an account.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session identity, or it no longer resolves to an account with the same credential.
    #[error("Authentication required")]
    Unauthenticated,

    /// The session's account exists but carries the wrong role.
    #[error("Role '{required}' required, session has role '{actual}'")]
    Forbidden {
        /// The role the operation requires
        required: Role,
        /// The role of the session's account
        actual: Role,
    },
}

impl AuthError {
    /// Check if this error means the caller is not (or no longer) authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::Unauthenticated
        )
    }

    /// Check if this error means the caller is authenticated but not authorized.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden { .. })
    }
}

// Conversion from AuthError to the main Error type
impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
