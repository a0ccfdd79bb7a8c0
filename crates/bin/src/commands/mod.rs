//! Subcommand implementations.

pub mod files;
pub mod health;
pub mod serve;
pub mod user;
