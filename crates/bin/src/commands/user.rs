//! Account management commands.
//!
//! `user add` is how operation accounts come into existence; the web signup
//! only creates client accounts.

use std::io::BufRead;

use docshare::user::Role;
use serde::Serialize;

use crate::backend::open_instance;
use crate::cli::{StorageArgs, UserAddArgs};
use crate::output::{OutputFormat, print_json, print_table};

#[derive(Serialize)]
struct UserRow<'a> {
    id: i64,
    username: &'a str,
    role: Role,
}

/// Run the `user add` command
pub async fn add(args: &UserAddArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => read_password_line()?,
    };

    let instance = open_instance(&args.storage).await?;
    let user = instance
        .create_user(&args.username, &password, args.role.into())
        .await
        .map_err(|e| {
            if e.is_conflict() {
                format!("User '{}' already exists", args.username)
            } else {
                format!("Failed to create user '{}': {e}", args.username)
            }
        })?;

    match format {
        OutputFormat::Human => println!("Created {} account '{}'", user.role, user.username),
        OutputFormat::Json => print_json(&UserRow {
            id: user.id,
            username: &user.username,
            role: user.role,
        })?,
    }
    Ok(())
}

/// Run the `user list` command
pub async fn list(args: &StorageArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let instance = open_instance(args).await?;
    let users = instance.list_users().await?;

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|u| vec![u.id.to_string(), u.username.clone(), u.role.to_string()])
                .collect();
            print_table(&["ID", "USERNAME", "ROLE"], &rows, "No users found.");
        }
        OutputFormat::Json => {
            let rows: Vec<UserRow<'_>> = users
                .iter()
                .map(|u| UserRow {
                    id: u.id,
                    username: &u.username,
                    role: u.role,
                })
                .collect();
            print_json(&rows)?;
        }
    }
    Ok(())
}

/// Read one line from stdin, without the trailing newline.
fn read_password_line() -> Result<String, Box<dyn std::error::Error>> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
