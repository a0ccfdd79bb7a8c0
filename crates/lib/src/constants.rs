//! Constants used throughout the Docshare library.
//!
//! This module provides central definitions for role names, the upload
//! extension policy, and default filesystem locations.

/// Role name for accounts that upload documents.
pub const ROLE_OPERATION: &str = "operation";

/// Role name for accounts that list and download documents.
pub const ROLE_CLIENT: &str = "client";

/// File extensions accepted by the upload handler, lowercase and without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pptx", "docx", "xlsx"];

/// Default directory holding uploaded files, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Prefix of the temporary files written while an upload is in flight.
///
/// Sanitized filenames never start with a dot, so these can not collide with stored files.
pub const UPLOAD_TEMP_PREFIX: &str = ".upload-";
