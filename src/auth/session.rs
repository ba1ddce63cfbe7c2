// Authenticated sessions and the in-process session store

use moka::future::Cache;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::roles::RoleSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),
}

/// The acting user: identity plus role set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub roles: RoleSet,
}

impl Session {
    pub fn new(email: &str, roles: RoleSet) -> Result<Self, SessionError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(SessionError::InvalidEmail(email));
        }
        Ok(Self { email, roles })
    }
}

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Single `@`, non-empty local part, dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Token → session map with idle expiry
///
/// Sessions are issued by whatever authenticates the user; this store only
/// resolves the cookie token on each request.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_timeout)
            .build();
        Self { sessions }
    }

    /// Register a session under a caller-chosen token (development seeding)
    pub async fn insert(&self, token: &str, session: Session) {
        if !session.roles.unknown().is_empty() {
            warn!(
                email = %session.email,
                unknown_roles = ?session.roles.unknown(),
                "Session carries roles outside the known vocabulary"
            );
        }
        self.sessions.insert(token.to_string(), session).await;
    }

    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token).await;
        if session.is_none() {
            debug!("Unknown or expired session token");
        }
        session
    }
}
