//! User accounts and roles
//!
//! A [`User`] is a username, a password hash and a [`Role`]. Accounts are
//! created once and never mutated or deleted by the application itself.
//!
//! ## Roles
//!
//! - [`Role::Operation`]: uploads documents. Only created out-of-band (CLI).
//! - [`Role::Client`]: lists and downloads documents. Created by signup.

pub mod crypto;
pub mod errors;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_CLIENT, ROLE_OPERATION};

pub use errors::UserError;

/// Stable identifier assigned by the credential store.
pub type UserId = i64;

/// Coarse capability class of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Uploader
    Operation,
    /// Downloader
    Client,
}

impl Role {
    /// The role name as stored in the credential store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operation => ROLE_OPERATION,
            Role::Client => ROLE_CLIENT,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    // Exact match only, role names are compared case-sensitively everywhere.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_OPERATION => Ok(Role::Operation),
            ROLE_CLIENT => Ok(Role::Client),
            other => Err(UserError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string, see [`crypto`].
    pub password_hash: String,
    pub role: Role,
}

impl User {
    /// Check whether this account carries the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
