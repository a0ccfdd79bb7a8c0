//!
//! Docshare: role-gated sharing of office documents.
//! This library provides the core components behind the Docshare web server.
//!
//! ## Core Concepts
//!
//! * **Users (`user::User`)**: Accounts with a username, an Argon2 password hash and a [`user::Role`].
//!   Signup always creates `client` accounts; `operation` accounts are provisioned by an administrator.
//! * **Backends (`backend::BackendImpl`)**: A pluggable persistence layer combining a
//!   [`backend::CredentialStore`] and a [`backend::FileRegistry`]. Available as an in-memory
//!   backend and as a SQL backend (SQLite or PostgreSQL).
//! * **Gates (`auth`)**: The Session Gate and Role Gate that every protected operation passes
//!   through, returning an [`auth::Access`] instead of running the operation on failure.
//! * **File storage (`files::FileStorage`)**: The upload directory holding one file per
//!   sanitized filename. The registry and the filesystem are separate authorities.
//! * **Instance (`Instance`)**: The facade tying the above together; a cheap-to-clone handle
//!   passed to request handlers.

pub mod auth;
pub mod backend;
pub mod constants;
pub mod files;
pub mod instance;
pub mod user;

/// Re-export the `Instance` struct for easier access.
pub use instance::Instance;

/// Result type used throughout the Docshare library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Docshare library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured user errors from the user module
    #[error(transparent)]
    User(user::UserError),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured backend errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured file storage errors from the files module
    #[error(transparent)]
    File(files::FileError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::User(_) => "user",
            Error::Auth(_) => "auth",
            Error::Backend(_) => "backend",
            Error::File(_) => "files",
            Error::Io(_) => "io",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_not_found(),
            Error::File(file_err) => file_err.is_not_found(),
            Error::Io(io_err) => io_err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_unauthenticated(),
            Error::User(user_err) => user_err.is_credential_error(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_forbidden(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_validation_error(),
            Error::File(file_err) => file_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::File(file_err) => file_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}
