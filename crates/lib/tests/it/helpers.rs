use docshare::{
    Instance,
    auth::SessionIdentity,
    backend::{BackendImpl, database::InMemory},
    user::{Role, User},
};
use tempfile::TempDir;

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// TEST_BACKEND=sqlite cargo test --features sqlite
/// ```
pub async fn test_backend() -> Box<dyn BackendImpl> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use docshare::backend::database::Sqlite;
                Box::new(
                    Sqlite::in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use docshare::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/docshare_test".to_string());
                Box::new(
                    Postgres::connect_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Box::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// An Instance over a fresh backend and a temporary upload root.
///
/// The upload root is removed when the context is dropped.
pub struct TestContext {
    pub instance: Instance,
    pub upload_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let instance = Instance::open(test_backend().await, upload_dir.path())
            .await
            .expect("Failed to create test instance");
        Self {
            instance,
            upload_dir,
        }
    }

    /// Create an account and return it with a session identity for it.
    pub async fn user_with_session(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> (User, SessionIdentity) {
        let user = self
            .instance
            .create_user(username, password, role)
            .await
            .expect("Failed to create user");
        let identity = SessionIdentity::for_user(&user);
        (user, identity)
    }

    /// Names of the files present in the upload root.
    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .expect("Failed to read upload dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
