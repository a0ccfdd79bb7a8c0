//! Error types for the user system
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Password verification failed")]
    PasswordVerificationFailed,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },
}

impl UserError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::UserNotFound { .. })
    }

    /// Check if this error indicates the username is taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, UserError::UsernameAlreadyExists { .. })
    }

    /// Check if this error is a rejected credential.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            UserError::InvalidPassword | UserError::PasswordVerificationFailed
        )
    }

    /// Check if this error is caused by invalid input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            UserError::EmptyUsername | UserError::InvalidRole { .. }
        )
    }
}

impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
