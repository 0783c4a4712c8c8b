//! Operator gate
//!
//! A single shared password unlocks the admin surface. A successful login
//! hands out a random session token that is kept in memory until logout,
//! expiry, or restart. This keeps casual visitors out of the editor; it is
//! not an access-control system.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Password used when none is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// An issued session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Password check plus the set of live sessions
pub struct AdminGate {
    password: String,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AdminGate {
    pub fn new(password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            password: password.into(),
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session if the password matches
    pub async fn login(&self, password: &str) -> Option<Session> {
        if password != self.password {
            tracing::warn!("Admin login rejected");
            return None;
        }

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());

        tracing::info!(active_sessions = sessions.len(), "Admin logged in");
        Some(session)
    }

    /// End a session; returns whether it existed
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token).is_some();
        if removed {
            tracing::info!("Admin logged out");
        }
        removed
    }

    /// Whether `token` belongs to a live session
    pub async fn verify(&self, token: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .is_some_and(|s| s.expires_at > Utc::now())
    }

    pub async fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.expires_at > now)
            .count()
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
