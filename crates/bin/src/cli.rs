//! CLI argument definitions for the Docshare binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docshare::{constants::DEFAULT_UPLOAD_DIR, user::Role};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// Process memory, lost on exit (for development)
    Inmemory,
}

/// Role accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Uploads documents
    Operation,
    /// Lists and downloads documents
    Client,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Operation => Role::Operation,
            RoleArg::Client => Role::Client,
        }
    }
}

/// Docshare office document sharing server
#[derive(Parser, Debug)]
#[command(name = "docshare")]
#[command(about = "Docshare: role-gated sharing of office documents")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Docshare web server
    Serve(ServeArgs),
    /// Check health of a running Docshare server
    Health(HealthArgs),
    /// Manage accounts
    #[command(subcommand)]
    User(UserCommands),
    /// Inspect the upload registry
    #[command(subcommand)]
    Files(FilesCommands),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account, e.g. an operation account
    Add(UserAddArgs),
    /// List accounts
    List(StorageArgs),
}

#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    /// List registry records
    List(StorageArgs),
}

/// Where accounts and upload records live.
#[derive(Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "DOCSHARE_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores docshare.db
    #[arg(short = 'D', long, env = "DOCSHARE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (takes precedence over the --db-* parts)
    #[arg(long, env = "DOCSHARE_POSTGRES_URL")]
    pub postgres_url: Option<String>,

    /// PostgreSQL user
    #[arg(long, env = "DOCSHARE_DB_USER")]
    pub db_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "DOCSHARE_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// PostgreSQL host
    #[arg(long, env = "DOCSHARE_DB_HOST")]
    pub db_host: Option<String>,

    /// PostgreSQL port
    #[arg(long, env = "DOCSHARE_DB_PORT")]
    pub db_port: Option<u16>,

    /// PostgreSQL database name
    #[arg(long, env = "DOCSHARE_DB_NAME")]
    pub db_name: Option<String>,
}

/// Backend plus upload root, for admin commands.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Directory holding uploaded files
    #[arg(short = 'U', long, default_value = DEFAULT_UPLOAD_DIR, env = "DOCSHARE_UPLOAD_DIR")]
    pub upload_dir: PathBuf,
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "DOCSHARE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "DOCSHARE_HOST")]
    pub host: String,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Secret used to sign session cookies
    #[arg(long, env = "DOCSHARE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Session lifetime in seconds
    #[arg(long, default_value_t = 86_400, env = "DOCSHARE_SESSION_TTL")]
    pub session_ttl: u64,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 25 * 1024 * 1024, env = "DOCSHARE_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Public base URL for download references (defaults to the request Host)
    #[arg(long, env = "DOCSHARE_PUBLIC_URL")]
    pub public_url: Option<url::Url>,
}

/// Arguments for the health command
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "DOCSHARE_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the user add command
#[derive(Args, Debug)]
pub struct UserAddArgs {
    /// Username of the new account
    pub username: String,

    /// Role of the new account
    #[arg(short, long, value_enum, default_value = "operation")]
    pub role: RoleArg,

    /// Password; read from stdin when omitted
    #[arg(long, env = "DOCSHARE_NEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(flatten)]
    pub storage: StorageArgs,
}
