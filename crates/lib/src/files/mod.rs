//! Upload storage
//!
//! [`FileStorage`] owns the upload root: one regular file per sanitized
//! filename. It is the authority on which bytes exist. The
//! [`FileRegistry`](crate::backend::FileRegistry) is the authority on which
//! files clients can see; the two are not transactionally linked.
//!
//! ## Filenames
//!
//! A submitted filename goes through two checks, in order:
//!
//! 1. [`has_allowed_extension`]: the text after the last `.`, lowercased, must be
//!    one of [`ALLOWED_EXTENSIONS`]. Names without a `.` are rejected.
//! 2. [`sanitize_filename`]: path components and unsafe characters are removed,
//!    leaving a name built from `[A-Za-z0-9_.-]` that is safe to join onto the root.
//!
//! Writes go to a temporary file next to the target and are renamed into place,
//! so a concurrent fetch sees either the previous bytes or the new ones.

pub mod errors;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::Result;
use crate::constants::{ALLOWED_EXTENSIONS, UPLOAD_TEMP_PREFIX};

pub use errors::FileError;

/// Registry record of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    /// Sanitized name, also the storage key. Not unique across records.
    pub filename: String,
    /// Username of the uploading session. Not checked against the credential store.
    pub uploader: String,
}

/// Check the extension policy on a raw, unsanitized filename.
///
/// Case-insensitive match of the substring after the last `.`.
pub fn has_allowed_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a filename to a safe storage key.
///
/// Compatibility-decomposes the name and drops non-ASCII characters, turns path
/// separators and whitespace runs into `_`, removes everything outside
/// `[A-Za-z0-9_.-]` and trims leading and trailing `.` and `_`.
///
/// Returns `None` when nothing is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validate a submitted filename and return the name it will be stored under.
///
/// The sanitized name must still satisfy the extension policy; otherwise a name
/// such as `ü.docx` would be stored as `docx`.
pub fn storage_name_for(filename: &str) -> Result<String> {
    if filename.is_empty() {
        return Err(FileError::NoFile.into());
    }
    if !has_allowed_extension(filename) {
        return Err(FileError::BadFileType {
            filename: filename.to_string(),
        }
        .into());
    }
    let sanitized = sanitize_filename(filename).ok_or(FileError::InvalidFilename)?;
    if !has_allowed_extension(&sanitized) {
        return Err(FileError::BadFileType {
            filename: filename.to_string(),
        }
        .into());
    }
    Ok(sanitized)
}

/// Build the download reference for a stored file under `base`.
///
/// The filename is appended as one percent-encoded path segment after `download`.
pub fn download_url(base: &Url, filename: &str) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| FileError::InvalidBaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .push("download")
        .push(filename);
    Ok(url)
}

/// An opened stored file, ready to be streamed.
#[derive(Debug)]
pub struct StoredFile {
    pub filename: String,
    pub len: u64,
    pub file: fs::File,
}

/// The upload root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open the upload root, creating it (and missing parents) if absent.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(FileError::from)?;
        debug!(root = %root.display(), "Upload root ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a stored file.
    ///
    /// Only names that are already sanitized storage keys resolve. Anything else
    /// (traversal attempts, temp files, unknown characters) is `NotFound`.
    pub fn path_of(&self, filename: &str) -> Result<PathBuf> {
        match sanitize_filename(filename) {
            Some(sanitized) if sanitized == filename => Ok(self.root.join(sanitized)),
            _ => Err(FileError::NotFound {
                filename: filename.to_string(),
            }
            .into()),
        }
    }

    /// Write `bytes` under a sanitized name, replacing any existing file.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.path_of(filename)?;
        let temp = self
            .root
            .join(format!("{UPLOAD_TEMP_PREFIX}{}", uuid::Uuid::new_v4()));

        if let Err(e) = fs::write(&temp, bytes).await {
            remove_quietly(&temp).await;
            return Err(FileError::from(e).into());
        }
        if let Err(e) = fs::rename(&temp, &target).await {
            remove_quietly(&temp).await;
            return Err(FileError::from(e).into());
        }

        debug!(path = %target.display(), len = bytes.len(), "Stored upload");
        Ok(target)
    }

    /// Check whether a stored file exists, regardless of registry state.
    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_of(filename) {
            Ok(path) => fs::metadata(&path).await.is_ok_and(|m| m.is_file()),
            Err(_) => false,
        }
    }

    /// Open a stored file for reading.
    ///
    /// Missing files and non-regular files are `NotFound`; other filesystem
    /// failures are I/O errors.
    pub async fn open_file(&self, filename: &str) -> Result<StoredFile> {
        let path = self.path_of(filename)?;
        let not_found = || FileError::NotFound {
            filename: filename.to_string(),
        };

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found().into()),
            Err(e) => return Err(FileError::from(e).into()),
        };
        let metadata = file.metadata().await.map_err(FileError::from)?;
        if !metadata.is_file() {
            return Err(not_found().into());
        }

        Ok(StoredFile {
            filename: filename.to_string(),
            len: metadata.len(),
            file,
        })
    }

    /// Read a stored file completely.
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.path_of(filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FileError::NotFound {
                filename: filename.to_string(),
            }
            .into()),
            Err(e) => Err(FileError::from(e).into()),
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Failed to remove temporary upload");
    }
}
