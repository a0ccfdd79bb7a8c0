//! Session management for web interface
//!
//! Provides in-memory session storage mapping session tokens to the identity
//! captured at login. The identity is only a claim: every protected request
//! still runs it through the gates against current store state.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use docshare::auth::SessionIdentity;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

struct SessionEntry {
    identity: SessionIdentity,
    created_at: Instant,
}

/// In-memory session store
///
/// Maps session tokens (UUIDs) to session identities. Sessions expire after the
/// configured time to live and are lost on server restart.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a new session
    ///
    /// # Returns
    /// The session token (UUID) to be stored in a cookie
    pub async fn create_session(&self, identity: SessionIdentity) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            SessionEntry {
                identity,
                created_at: Instant::now(),
            },
        );
        token
    }

    /// Get the identity behind a session token
    ///
    /// Expired sessions are removed and reported as absent.
    pub async fn get_identity(&self, token: &str) -> Option<SessionIdentity> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(entry) if entry.created_at.elapsed() < self.ttl => {
                    return Some(entry.identity.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        tracing::debug!("Session expired");
        self.destroy_session(token).await;
        None
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Drop every expired session
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        before - sessions.len()
    }

    /// Get the number of active sessions (for debugging)
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
