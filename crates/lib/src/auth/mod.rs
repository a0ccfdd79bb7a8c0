//! Authentication and authorization for Docshare
//!
//! Three pieces guard every protected operation:
//!
//! - the **Authenticator** ([`authenticate`], [`verify_credentials`]) checks a
//!   username and password against the credential store;
//! - the **Session Gate** ([`require_session`]) re-resolves a session identity
//!   against current store state on every request;
//! - the **Role Gate** ([`require_role`]) additionally compares the account's role
//!   with the one the operation requires.
//!
//! Gates return an [`Access`] rather than an error so callers decide how each
//! outcome is presented. Store failures are still reported as errors.

pub mod errors;
mod gate;

use serde::{Deserialize, Serialize};

pub use errors::AuthError;
pub use gate::{authenticate, require_role, require_session, verify_credentials};

use crate::Result;
use crate::user::{Role, User};

/// What a session remembers about who logged in.
///
/// The credential stamp is the account's password hash at login time. If the
/// stored hash no longer matches, the session stops resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub username: String,
    pub credential_stamp: String,
}

impl SessionIdentity {
    /// Identity of a freshly authenticated account.
    pub fn for_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            credential_stamp: user.password_hash.clone(),
        }
    }

    /// Check whether the identity still matches a stored account.
    pub fn matches(&self, user: &User) -> bool {
        self.username == user.username && self.credential_stamp == user.password_hash
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The operation may run on behalf of this account.
    Granted(User),
    /// No usable session; the operation must not run.
    Unauthenticated,
    /// Authenticated with the wrong role; the operation must not run.
    Forbidden { required: Role, actual: Role },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    /// The granted account, or the matching [`AuthError`].
    pub fn into_result(self) -> Result<User> {
        match self {
            Access::Granted(user) => Ok(user),
            Access::Unauthenticated => Err(AuthError::Unauthenticated.into()),
            Access::Forbidden { required, actual } => {
                Err(AuthError::Forbidden { required, actual }.into())
            }
        }
    }
}
