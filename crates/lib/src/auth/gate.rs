//! Authenticator and gates

use tracing::{debug, warn};

use super::{Access, AuthError, SessionIdentity};
use crate::backend::CredentialStore;
use crate::user::{Role, User, UserError, crypto::verify_password};
use crate::{Error, Result};

/// Verify a username and password, returning the matching account.
///
/// Unknown usernames and wrong passwords both give `AuthError::InvalidCredentials`.
/// A stored hash that can not be parsed is treated as a mismatch.
pub async fn verify_credentials<S: CredentialStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<User> {
    let Some(user) = store.find_user(username).await? else {
        debug!(username, "Login for unknown user");
        return Err(AuthError::InvalidCredentials.into());
    };

    // Verification runs on the blocking pool.
    let password = password.to_owned();
    let password_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(password, password_hash))
        .await
        .map_err(|e| UserError::HashingFailed {
            reason: e.to_string(),
        })?;

    match verified {
        Ok(()) => Ok(user),
        Err(Error::User(UserError::PasswordVerificationFailed)) => {
            warn!(username, "Stored password hash is unusable");
            Err(AuthError::InvalidCredentials.into())
        }
        Err(_) => Err(AuthError::InvalidCredentials.into()),
    }
}

/// True iff an account with exactly this username and password exists.
pub async fn authenticate<S: CredentialStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<bool> {
    match verify_credentials(store, username, password).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_authentication_error() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Session Gate.
///
/// Grants access only if `identity` is present and still resolves to an account
/// whose credential matches the one captured at login.
pub async fn require_session<S: CredentialStore + ?Sized>(
    store: &S,
    identity: Option<&SessionIdentity>,
) -> Result<Access> {
    let Some(identity) = identity else {
        return Ok(Access::Unauthenticated);
    };

    match store.find_user(&identity.username).await? {
        Some(user) if identity.matches(&user) => Ok(Access::Granted(user)),
        Some(_) => {
            warn!(username = %identity.username, "Session credential is stale");
            Ok(Access::Unauthenticated)
        }
        None => {
            warn!(username = %identity.username, "Session user no longer exists");
            Ok(Access::Unauthenticated)
        }
    }
}

/// Role Gate, composed over the Session Gate.
pub async fn require_role<S: CredentialStore + ?Sized>(
    store: &S,
    identity: Option<&SessionIdentity>,
    required: Role,
) -> Result<Access> {
    match require_session(store, identity).await? {
        Access::Granted(user) if user.has_role(required) => Ok(Access::Granted(user)),
        Access::Granted(user) => {
            warn!(
                username = %user.username,
                required = %required,
                actual = %user.role,
                "Role gate rejected session"
            );
            Ok(Access::Forbidden {
                required,
                actual: user.role,
            })
        }
        denied => Ok(denied),
    }
}
