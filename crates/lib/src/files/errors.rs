//! Error types for upload storage and retrieval
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("No file part in request")]
    NoFile,

    #[error("File type not allowed: {filename}")]
    BadFileType { filename: String },

    #[error("Filename has no usable characters after sanitizing")]
    InvalidFilename,

    #[error("File not found: {filename}")]
    NotFound { filename: String },

    #[error("Cannot build download references under {url}")]
    InvalidBaseUrl { url: String },

    #[error("Upload storage failure: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Check if this error indicates the requested file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileError::NotFound { .. })
    }

    /// Check if this error rejects the submitted upload itself.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            FileError::NoFile | FileError::BadFileType { .. } | FileError::InvalidFilename
        )
    }

    /// Check if this error comes from the filesystem.
    pub fn is_io_error(&self) -> bool {
        matches!(self, FileError::Io { .. })
    }
}

impl From<std::io::Error> for FileError {
    fn from(source: std::io::Error) -> Self {
        FileError::Io { source }
    }
}

impl From<FileError> for crate::Error {
    fn from(err: FileError) -> Self {
        crate::Error::File(err)
    }
}
