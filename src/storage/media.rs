//! Storage media abstraction
//!
//! Provides a trait for session storage that can be implemented by
//! different backends (in-process memory, one JSON document per session).

use crate::error::WsmResult;
use crate::session::SessionRef;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Abstract storage media interface
///
/// Every mutating operation reports [`WsmError::SessionNotExist`](crate::WsmError::SessionNotExist)
/// when the target identifier is absent, so callers can tell "already gone"
/// apart from "acted on".
#[async_trait]
pub trait StorageMedia: Send + Sync {
    /// Create and register an empty session under `session_id`
    ///
    /// An identifier that is already registered is replaced by a fresh
    /// session; the live count does not change.
    async fn initialize_session(&self, session_id: &str) -> WsmResult<SessionRef>;

    /// Fetch the session registered under `session_id`
    async fn retrieve_session(&self, session_id: &str) -> WsmResult<SessionRef>;

    /// Refresh the last-access time of a session
    async fn update_session_last_access(&self, session_id: &str) -> WsmResult<()>;

    /// Remove a session
    async fn destroy_session(&self, session_id: &str) -> WsmResult<()>;

    /// Evict every session idle for at least `max_lifetime`
    async fn terminate_session_on_expiration(&self, max_lifetime: Duration);

    /// Number of live sessions
    async fn active_sessions(&self) -> u64;

    /// Backend name for display
    fn name(&self) -> &'static str;
}

/// Type alias for Arc-wrapped storage media trait objects
pub type StorageMediaRef = Arc<dyn StorageMedia>;
