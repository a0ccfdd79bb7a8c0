//! Account and upload record operations for SQL backends.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::files::UploadedFile;
use crate::user::{Role, User, UserError};

use super::{SqlxBackend, SqlxResultExt};

type UserRow = (i64, String, String, String);
type FileRow = (i64, String, String);

fn user_from_row((id, username, password_hash, role): UserRow) -> Result<User> {
    let role: Role = role.parse().map_err(|_| BackendError::InvalidRecord {
        table: "users",
        reason: format!("unknown role '{role}' for user '{username}'"),
    })?;
    Ok(User {
        id,
        username,
        password_hash,
        role,
    })
}

fn file_from_row((id, filename, uploader): FileRow) -> UploadedFile {
    UploadedFile {
        id,
        filename,
        uploader,
    }
}

/// Look up an account by exact username.
pub async fn find_user(backend: &SqlxBackend, username: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, username, password_hash, role FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(backend.pool())
    .await
    .sql_context("Failed to look up user")?;

    row.map(user_from_row).transpose()
}

/// Insert an account, relying on the `UNIQUE` constraint to reject taken usernames.
pub async fn create_user(
    backend: &SqlxBackend,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let result: std::result::Result<(i64,), sqlx::Error> = sqlx::query_as(
        "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(backend.pool())
    .await;

    match result {
        Ok((id,)) => Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(UserError::UsernameAlreadyExists {
                username: username.to_string(),
            }
            .into())
        }
        Err(e) => Err(e).sql_context("Failed to create user"),
    }
}

/// List all accounts ordered by id.
pub async fn list_users(backend: &SqlxBackend) -> Result<Vec<User>> {
    let rows: Vec<UserRow> =
        sqlx::query_as("SELECT id, username, password_hash, role FROM users ORDER BY id")
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to list users")?;

    rows.into_iter().map(user_from_row).collect()
}

/// List all upload records in insertion order.
pub async fn list_files(backend: &SqlxBackend) -> Result<Vec<UploadedFile>> {
    let rows: Vec<FileRow> =
        sqlx::query_as("SELECT id, filename, uploader FROM uploaded_files ORDER BY id")
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to list uploaded files")?;

    Ok(rows.into_iter().map(file_from_row).collect())
}

/// The earliest upload record with this filename.
pub async fn find_file(backend: &SqlxBackend, filename: &str) -> Result<Option<UploadedFile>> {
    let row: Option<FileRow> = sqlx::query_as(
        "SELECT id, filename, uploader FROM uploaded_files WHERE filename = $1 ORDER BY id LIMIT 1",
    )
    .bind(filename)
    .fetch_optional(backend.pool())
    .await
    .sql_context("Failed to look up uploaded file")?;

    Ok(row.map(file_from_row))
}

/// Append an upload record.
pub async fn record_file(
    backend: &SqlxBackend,
    filename: &str,
    uploader: &str,
) -> Result<UploadedFile> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO uploaded_files (filename, uploader) VALUES ($1, $2) RETURNING id",
    )
    .bind(filename)
    .bind(uploader)
    .fetch_one(backend.pool())
    .await
    .sql_context("Failed to record uploaded file")?;

    Ok(UploadedFile {
        id,
        filename: filename.to_string(),
        uploader: uploader.to_string(),
    })
}
