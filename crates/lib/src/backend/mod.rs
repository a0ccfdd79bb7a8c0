//! Backend implementations for Docshare persistence
//!
//! This module provides the two store interfaces the application depends on and
//! the backends implementing them:
//!
//! - [`CredentialStore`]: username → (password hash, role) records.
//! - [`FileRegistry`]: metadata of uploaded files, in insertion order.
//!
//! Both interfaces are always provided by the same backend, so a deployment
//! chooses its persistence once ([`BackendImpl`]) instead of maintaining forked
//! in-memory and database-backed code paths.
//!
//! Backends enforce username uniqueness themselves (a write lock spanning the
//! check and the insert, or a `UNIQUE` constraint), so concurrent signups for one
//! username can not both succeed.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::files::UploadedFile;
use crate::user::{Role, User};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage of user accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by exact username.
    ///
    /// # Returns
    /// `Ok(None)` if no account has that username.
    async fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// Create an account.
    ///
    /// # Arguments
    /// * `username` - Unique, non-empty username
    /// * `password_hash` - Already hashed secret; stores never see clear text
    /// * `role` - Role of the new account
    ///
    /// # Returns
    /// The stored account, or `UserError::UsernameAlreadyExists` if the username is
    /// taken. The existing account is left untouched in that case.
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User>;

    /// List all accounts ordered by id.
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Storage of uploaded file metadata.
#[async_trait]
pub trait FileRegistry: Send + Sync {
    /// All records, in the order they were recorded.
    async fn list_files(&self) -> Result<Vec<UploadedFile>>;

    /// The earliest record with exactly this filename.
    async fn find_file(&self, filename: &str) -> Result<Option<UploadedFile>>;

    /// Append a record. Duplicate filenames are allowed and produce a second record.
    async fn record_file(&self, filename: &str, uploader: &str) -> Result<UploadedFile>;
}

/// A complete persistence backend.
///
/// All backends must be `Send` and `Sync` to be shared across request handlers,
/// and implement `Any` to allow for downcasting if needed.
pub trait BackendImpl: CredentialStore + FileRegistry + Any {
    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Short name of the persistence mechanism, e.g. for health reports.
    fn kind_label(&self) -> &'static str;
}
