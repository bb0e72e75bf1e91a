//! In-process storage media
//!
//! A single lock guards the session map and the live counter. Sessions are
//! shared handles, so values written through a handle are what the next
//! `retrieve_session` sees.

use crate::error::{WsmError, WsmResult};
use crate::session::id::redact;
use crate::session::{Session, SessionRecord, SessionRef, SessionValue};
use crate::storage::media::StorageMedia;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Session living in a [`MemoryStorage`]
#[derive(Debug)]
pub struct MemorySession {
    id: String,
    record: Mutex<SessionRecord>,
}

impl MemorySession {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            record: Mutex::new(SessionRecord::new(id)),
        }
    }

    fn last_access(&self) -> DateTime<Utc> {
        self.record.lock().last_access
    }

    fn touch(&self) {
        self.record.lock().touch();
    }

    #[cfg(test)]
    fn set_last_access(&self, at: DateTime<Utc>) {
        self.record.lock().last_access = at;
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn set_value(&self, key: &str, value: SessionValue) -> WsmResult<()> {
        let mut record = self.record.lock();
        record.values.insert(key.to_string(), value);
        record.touch();
        Ok(())
    }

    async fn get_value(&self, key: &str) -> WsmResult<Option<SessionValue>> {
        let mut record = self.record.lock();
        record.touch();
        Ok(record.values.get(key).cloned())
    }

    async fn delete_value(&self, key: &str) -> WsmResult<()> {
        let mut record = self.record.lock();
        record.values.remove(key);
        record.touch();
        Ok(())
    }

    fn session_id(&self) -> &str {
        &self.id
    }
}

#[derive(Default)]
struct Sessions {
    active: u64,
    entries: HashMap<String, Arc<MemorySession>>,
}

/// Memory storage media
#[derive(Default)]
pub struct MemoryStorage {
    sessions: Mutex<Sessions>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict sessions expired at `now`; returns the number evicted
    pub fn terminate_expired_at(&self, now: DateTime<Utc>, max_lifetime: Duration) -> usize {
        let mut sessions = self.sessions.lock();

        let expired: Vec<String> = sessions
            .entries
            .iter()
            .filter(|(_, session)| {
                crate::session::is_expired(session.last_access(), max_lifetime, now)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if sessions.entries.remove(id).is_some() {
                sessions.active -= 1;
                debug!(session = redact(id), "expired session evicted");
            }
        }

        expired.len()
    }

    fn get(&self, session_id: &str) -> WsmResult<Arc<MemorySession>> {
        self.sessions
            .lock()
            .entries
            .get(session_id)
            .cloned()
            .ok_or(WsmError::SessionNotExist)
    }
}

#[async_trait]
impl StorageMedia for MemoryStorage {
    async fn initialize_session(&self, session_id: &str) -> WsmResult<SessionRef> {
        let session = Arc::new(MemorySession::new(session_id));

        let mut sessions = self.sessions.lock();
        let replaced = sessions
            .entries
            .insert(session_id.to_string(), Arc::clone(&session));
        if replaced.is_none() {
            sessions.active += 1;
        }

        debug!(session = redact(session_id), "session initialized");
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> WsmResult<SessionRef> {
        let session: SessionRef = self.get(session_id)?;
        Ok(session)
    }

    async fn update_session_last_access(&self, session_id: &str) -> WsmResult<()> {
        let sessions = self.sessions.lock();
        let session = sessions
            .entries
            .get(session_id)
            .ok_or(WsmError::SessionNotExist)?;
        session.touch();
        Ok(())
    }

    async fn destroy_session(&self, session_id: &str) -> WsmResult<()> {
        let mut sessions = self.sessions.lock();
        if sessions.entries.remove(session_id).is_none() {
            return Err(WsmError::SessionNotExist);
        }
        sessions.active -= 1;

        debug!(session = redact(session_id), "session destroyed");
        Ok(())
    }

    async fn terminate_session_on_expiration(&self, max_lifetime: Duration) {
        let evicted = self.terminate_expired_at(Utc::now(), max_lifetime);
        if evicted > 0 {
            info!(evicted, storage = self.name(), "expired sessions terminated");
        }
    }

    async fn active_sessions(&self) -> u64 {
        self.sessions.lock().active
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
