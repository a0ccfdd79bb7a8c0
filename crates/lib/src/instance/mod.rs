//!
//! Provides the main entry point of the library (`Instance`).
//!
//! `Instance` ties a persistence backend to the upload root and exposes the
//! account, gate, upload and retrieval operations request handlers call.

use std::{path::PathBuf, sync::Arc};

use tracing::{error, info, warn};
use url::Url;

use crate::{
    Result,
    auth::{self, Access, SessionIdentity},
    backend::{BackendImpl, CredentialStore, FileRegistry},
    files::{self, FileError, FileStorage, StoredFile, UploadedFile},
    user::{Role, User, UserError, crypto::hash_password},
};

/// Internal state for Instance
///
/// Instance itself is just a cheap-to-clone handle wrapping Arc<InstanceInternal>.
struct InstanceInternal {
    /// Credential store and file registry
    backend: Box<dyn BackendImpl>,
    /// Upload root
    storage: FileStorage,
}

impl std::fmt::Debug for InstanceInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceInternal")
            .field("backend", &self.backend.kind_label())
            .field("storage", &self.storage)
            .finish()
    }
}

/// The Docshare application core.
///
/// Instance owns the persistence backend and the upload storage. Handlers
/// receive a clone and call its operations after passing the gates:
///
/// - accounts: [`signup`](Self::signup), [`create_user`](Self::create_user),
///   [`login`](Self::login), [`authenticate`](Self::authenticate)
/// - gates: [`check_session`](Self::check_session), [`check_role`](Self::check_role)
/// - uploads: [`upload`](Self::upload)
/// - retrieval: [`list_files`](Self::list_files), [`locate_file`](Self::locate_file),
///   [`fetch_file`](Self::fetch_file)
///
/// Instance is a cheap-to-clone handle around `Arc<InstanceInternal>`.
///
/// ## Example
///
/// ```
/// # use docshare::{backend::database::InMemory, Instance, user::Role};
/// # #[tokio::main]
/// # async fn main() -> docshare::Result<()> {
/// # let dir = std::env::temp_dir().join(format!("docshare-doc-{}", std::process::id()));
/// let instance = Instance::open(Box::new(InMemory::new()), &dir).await?;
///
/// instance.signup("alice", "pw1").await?;
/// assert!(instance.authenticate("alice", "pw1").await?);
/// assert!(!instance.authenticate("alice", "pw2").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Instance {
    inner: Arc<InstanceInternal>,
}

impl Instance {
    /// Create an instance over a backend and an already opened upload storage.
    pub fn new(backend: Box<dyn BackendImpl>, storage: FileStorage) -> Self {
        Self {
            inner: Arc::new(InstanceInternal { backend, storage }),
        }
    }

    /// Open an instance, creating the upload root if it is absent.
    ///
    /// # Arguments
    /// * `backend` - The persistence backend holding accounts and upload records
    /// * `upload_root` - Directory holding the uploaded files
    pub async fn open(backend: Box<dyn BackendImpl>, upload_root: impl Into<PathBuf>) -> Result<Self> {
        let storage = FileStorage::open(upload_root).await?;
        info!(
            backend = backend.kind_label(),
            upload_root = %storage.root().display(),
            "Opened Docshare instance"
        );
        Ok(Self::new(backend, storage))
    }

    /// Get a reference to the backend
    pub fn backend(&self) -> &dyn BackendImpl {
        self.inner.backend.as_ref()
    }

    /// Get a reference to the upload storage
    pub fn storage(&self) -> &FileStorage {
        &self.inner.storage
    }

    // === Accounts ===

    /// Create a `client` account, the only role signup hands out.
    ///
    /// # Errors
    /// `UserError::UsernameAlreadyExists` if the name is taken; the existing account
    /// is not modified.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User> {
        self.create_user(username, password, Role::Client).await
    }

    /// Create an account with any role. Used for out-of-band provisioning of
    /// `operation` accounts.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        if username.is_empty() {
            return Err(UserError::EmptyUsername.into());
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(password))
            .await
            .map_err(|e| UserError::HashingFailed {
                reason: e.to_string(),
            })??;
        let user = self
            .backend()
            .create_user(username, &password_hash, role)
            .await?;
        info!(username, role = %role, "Created account");
        Ok(user)
    }

    /// True iff an account with exactly this username and password exists.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        auth::authenticate(self.backend(), username, password).await
    }

    /// Verify credentials and return the account to open a session for.
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` on any mismatch.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = auth::verify_credentials(self.backend(), username, password).await?;
        info!(username, role = %user.role, "Login succeeded");
        Ok(user)
    }

    /// List all accounts ordered by id.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.backend().list_users().await
    }

    // === Gates ===

    /// Session Gate against current store state.
    pub async fn check_session(&self, identity: Option<&SessionIdentity>) -> Result<Access> {
        auth::require_session(self.backend(), identity).await
    }

    /// Role Gate against current store state.
    pub async fn check_role(
        &self,
        identity: Option<&SessionIdentity>,
        required: Role,
    ) -> Result<Access> {
        auth::require_role(self.backend(), identity, required).await
    }

    // === Uploads ===

    /// Store an upload and record it in the registry.
    ///
    /// The caller must have passed the Role Gate for `operation`; `uploader` is the
    /// granted account. The raw `filename` is checked against the extension policy,
    /// then sanitized; the bytes replace any file already stored under that name
    /// and a new registry record is appended.
    ///
    /// # Errors
    /// `FileError::NoFile` for an empty filename, `FileError::BadFileType` for a
    /// disallowed extension, `FileError::InvalidFilename` if nothing survives
    /// sanitizing. Nothing is written in those cases.
    pub async fn upload(&self, uploader: &User, filename: &str, bytes: &[u8]) -> Result<UploadedFile> {
        let stored_name = files::storage_name_for(filename)?;

        if let Err(e) = self.storage().save(&stored_name, bytes).await {
            error!(filename = %stored_name, error = %e, "Failed to store upload");
            return Err(e);
        }

        match self
            .backend()
            .record_file(&stored_name, &uploader.username)
            .await
        {
            Ok(record) => {
                info!(
                    filename = %record.filename,
                    uploader = %record.uploader,
                    len = bytes.len(),
                    "Recorded upload"
                );
                Ok(record)
            }
            Err(e) => {
                // The bytes are already in place; the file stays invisible to
                // listings until uploaded again.
                error!(
                    filename = %stored_name,
                    error = %e,
                    "Stored upload but failed to record it"
                );
                Err(e)
            }
        }
    }

    // === Retrieval ===

    /// All registry records, in registry order.
    pub async fn list_files(&self) -> Result<Vec<UploadedFile>> {
        self.backend().list_files().await
    }

    /// The registry record behind a download reference.
    ///
    /// # Errors
    /// `FileError::NotFound` if no record has this filename, whether or not the
    /// bytes exist.
    pub async fn locate_file(&self, filename: &str) -> Result<UploadedFile> {
        match self.backend().find_file(filename).await? {
            Some(record) => {
                if !self.storage().exists(&record.filename).await {
                    warn!(filename, "Registry record has no stored file");
                }
                Ok(record)
            }
            None => Err(FileError::NotFound {
                filename: filename.to_string(),
            }
            .into()),
        }
    }

    /// Locate a file and build its download reference under `base`.
    pub async fn download_url(&self, base: &Url, filename: &str) -> Result<Url> {
        let record = self.locate_file(filename).await?;
        files::download_url(base, &record.filename)
    }

    /// Open a stored file for streaming.
    ///
    /// Decided by storage alone: a file that was never recorded but exists is
    /// served, a recorded file whose bytes were removed is `NotFound`.
    pub async fn fetch_file(&self, filename: &str) -> Result<StoredFile> {
        self.storage().open_file(filename).await
    }
}
