//! Session contract and the record shared by storage backends

use crate::error::WsmResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Opaque payload stored under a session key
pub type SessionValue = serde_json::Value;

/// Per-session key/value access
///
/// Implementations are handed out by a [`StorageMedia`](crate::storage::StorageMedia)
/// and stay bound to it: mutations go straight to the owning store.
#[async_trait]
pub trait Session: Send + Sync + Debug {
    /// Insert or overwrite `key`
    async fn set_value(&self, key: &str, value: SessionValue) -> WsmResult<()>;

    /// Look up `key`; an absent key is `Ok(None)`
    async fn get_value(&self, key: &str) -> WsmResult<Option<SessionValue>>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete_value(&self, key: &str) -> WsmResult<()>;

    /// The immutable session identifier
    fn session_id(&self) -> &str;
}

/// Shared handle to a session owned by some storage media
pub type SessionRef = Arc<dyn Session>;

/// Stored state of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier (unescaped)
    pub id: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// Last time the session was accessed
    pub last_access: DateTime<Utc>,

    /// Application values
    #[serde(default)]
    pub values: HashMap<String, SessionValue>,
}

impl SessionRecord {
    /// Create an empty record accessed now
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            last_access: now,
            values: HashMap::new(),
        }
    }

    /// Refresh the last-access time
    pub fn touch(&mut self) {
        self.last_access = Utc::now();
    }

    /// Whether the record is expired at `now` for the given lifetime
    pub fn is_expired_at(&self, now: DateTime<Utc>, max_lifetime: Duration) -> bool {
        is_expired(self.last_access, max_lifetime, now)
    }
}

/// A session is expired once `last_access + max_lifetime <= now`.
///
/// A last-access time in the future (clock skew) never counts as expired.
pub fn is_expired(last_access: DateTime<Utc>, max_lifetime: Duration, now: DateTime<Utc>) -> bool {
    match now.signed_duration_since(last_access).to_std() {
        Ok(idle) => idle >= max_lifetime,
        Err(_) => false,
    }
}
