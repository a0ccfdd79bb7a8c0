//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the store traits,
//! suitable for testing, development, or deployments where losing accounts
//! and file metadata on restart is acceptable.

use std::any::Any;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{BackendImpl, CredentialStore, FileRegistry};
use crate::files::UploadedFile;
use crate::user::{Role, User, UserError, UserId};

/// Accounts keyed by username, plus the next id to hand out.
#[derive(Debug, Default)]
struct UserTable {
    by_username: HashMap<String, User>,
    next_id: UserId,
}

/// A simple in-memory backend.
///
/// Accounts live in a `HashMap` keyed by username and file records in a `Vec`
/// that preserves insertion order. Each collection sits behind its own lock;
/// account creation checks and inserts under one write guard.
///
/// Nothing is persisted: all accounts (including provisioned operation
/// accounts) and all file records are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemory {
    users: RwLock<UserTable>,
    files: RwLock<Vec<UploadedFile>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemory {
    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.by_username.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User> {
        let mut users = self.users.write().await;
        if users.by_username.contains_key(username) {
            return Err(UserError::UsernameAlreadyExists {
                username: username.to_string(),
            }
            .into());
        }

        users.next_id += 1;
        let user = User {
            id: users.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        users
            .by_username
            .insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.by_username.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }
}

#[async_trait]
impl FileRegistry for InMemory {
    async fn list_files(&self) -> Result<Vec<UploadedFile>> {
        Ok(self.files.read().await.clone())
    }

    async fn find_file(&self, filename: &str) -> Result<Option<UploadedFile>> {
        let files = self.files.read().await;
        Ok(files.iter().find(|f| f.filename == filename).cloned())
    }

    async fn record_file(&self, filename: &str, uploader: &str) -> Result<UploadedFile> {
        let mut files = self.files.write().await;
        let record = UploadedFile {
            id: files.len() as i64 + 1,
            filename: filename.to_string(),
            uploader: uploader.to_string(),
        };
        files.push(record.clone());
        Ok(record)
    }
}

impl BackendImpl for InMemory {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind_label(&self) -> &'static str {
        "inmemory"
    }
}
