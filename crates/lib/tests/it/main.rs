/*! Integration tests for Docshare.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - user: Account creation, signup and the Authenticator
 * - auth: Session Gate and Role Gate
 * - backend: CredentialStore and FileRegistry implementations
 * - files: Upload, list, locate and fetch through the Instance
 * - scenarios: End-to-end flows across the modules
 *
 * Set TEST_BACKEND=sqlite to run everything against SQLite.
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("docshare=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod auth;
mod backend;
mod files;
mod helpers;
mod scenarios;
mod user;
