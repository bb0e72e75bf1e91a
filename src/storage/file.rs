//! File storage media
//!
//! One JSON document per session. Documents are named by the SHA-256 digest
//! of the session identifier, so cookie contents never reach the filesystem
//! as paths. A single async lock serializes every read-modify-write.

use crate::error::{WsmError, WsmResult};
use crate::session::id::redact;
use crate::session::{Session, SessionRecord, SessionRef, SessionValue};
use crate::storage::media::StorageMedia;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const DOCUMENT_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

struct FileStore {
    dir: PathBuf,
    /// Live session count; the lock also guards every document write
    active: Mutex<u64>,
}

impl FileStore {
    fn document_path(&self, session_id: &str) -> PathBuf {
        let digest = Sha256::digest(session_id.as_bytes());
        self.dir
            .join(format!("{}.{}", hex::encode(digest), DOCUMENT_EXTENSION))
    }

    async fn read(&self, path: &Path) -> WsmResult<Option<SessionRecord>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WsmError::io(
                format!("reading session document {}", path.display()),
                e,
            )),
        }
    }

    async fn write(&self, path: &Path, record: &SessionRecord) -> WsmResult<()> {
        let content = serde_json::to_string_pretty(record)?;
        let tmp = path.with_extension(TEMP_EXTENSION);

        fs::write(&tmp, content)
            .await
            .map_err(|e| WsmError::io(format!("writing session document {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| WsmError::io(format!("replacing session document {}", path.display()), e))
    }

    async fn load_existing(&self, session_id: &str) -> WsmResult<(PathBuf, SessionRecord)> {
        let path = self.document_path(session_id);
        let record = self
            .read(&path)
            .await?
            .ok_or(WsmError::SessionNotExist)?;
        Ok((path, record))
    }

    async fn document_paths(&self) -> WsmResult<Vec<PathBuf>> {
        self.paths_with_extension(DOCUMENT_EXTENSION).await
    }

    async fn paths_with_extension(&self, extension: &str) -> WsmResult<Vec<PathBuf>> {
        let mut paths = vec![];
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| WsmError::io("reading sessions directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WsmError::io("reading session entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == extension) {
                paths.push(path);
            }
        }

        Ok(paths)
    }

    /// Remove temporaries left by writes that never reached the rename
    async fn remove_stray_temporaries(&self) -> WsmResult<()> {
        for path in self.paths_with_extension(TEMP_EXTENSION).await? {
            fs::remove_file(&path)
                .await
                .map_err(|e| WsmError::io(format!("removing stray temporary {}", path.display()), e))?;
            debug!(path = %path.display(), "stray temporary removed");
        }
        Ok(())
    }

    /// Number of documents that parse as session records
    async fn count_readable(&self) -> WsmResult<u64> {
        let mut count = 0;
        for path in self.document_paths().await? {
            match self.read(&path).await {
                Ok(Some(_)) => count += 1,
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "not counting unreadable session document"),
            }
        }
        Ok(count)
    }

    /// Update a stored record in place
    async fn modify<F>(&self, session_id: &str, change: F) -> WsmResult<SessionRecord>
    where
        F: FnOnce(&mut SessionRecord) + Send,
    {
        let _guard = self.active.lock().await;
        let (path, mut record) = self.load_existing(session_id).await?;
        change(&mut record);
        record.touch();
        self.write(&path, &record).await?;
        Ok(record)
    }
}

/// Session stored as a document in a [`FileStorage`]
pub struct FileSession {
    id: String,
    store: Arc<FileStore>,
}

impl std::fmt::Debug for FileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSession")
            .field("id", &redact(&self.id))
            .field("dir", &self.store.dir)
            .finish()
    }
}

#[async_trait]
impl Session for FileSession {
    async fn set_value(&self, key: &str, value: SessionValue) -> WsmResult<()> {
        self.store
            .modify(&self.id, |record| {
                record.values.insert(key.to_string(), value);
            })
            .await
            .map(|_| ())
    }

    async fn get_value(&self, key: &str) -> WsmResult<Option<SessionValue>> {
        let record = self.store.modify(&self.id, |_| {}).await?;
        Ok(record.values.get(key).cloned())
    }

    async fn delete_value(&self, key: &str) -> WsmResult<()> {
        self.store
            .modify(&self.id, |record| {
                record.values.remove(key);
            })
            .await
            .map(|_| ())
    }

    fn session_id(&self) -> &str {
        &self.id
    }
}

/// File storage media
pub struct FileStorage {
    store: Arc<FileStore>,
}

impl FileStorage {
    /// Open (creating if needed) a session directory
    pub async fn open(dir: impl Into<PathBuf>) -> WsmResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| WsmError::io(format!("creating sessions directory {}", dir.display()), e))?;

        let mut store = FileStore {
            dir,
            active: Mutex::new(0),
        };
        store.remove_stray_temporaries().await?;
        let existing = store.count_readable().await?;
        *store.active.get_mut() = existing;

        debug!(dir = %store.dir.display(), sessions = existing, "file storage opened");
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Directory holding the session documents
    pub fn dir(&self) -> &Path {
        &self.store.dir
    }

    fn handle(&self, session_id: &str) -> SessionRef {
        Arc::new(FileSession {
            id: session_id.to_string(),
            store: Arc::clone(&self.store),
        })
    }

    /// All readable session records, most recently accessed first
    pub async fn list_records(&self) -> WsmResult<Vec<SessionRecord>> {
        let _guard = self.store.active.lock().await;
        let mut records = vec![];

        for path in self.store.document_paths().await? {
            match self.store.read(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session document"),
            }
        }

        records.sort_by(|a, b| b.last_access.cmp(&a.last_access));
        Ok(records)
    }

    /// Evict sessions expired at `now`; returns the number evicted
    pub async fn terminate_expired_at(
        &self,
        now: DateTime<Utc>,
        max_lifetime: Duration,
    ) -> WsmResult<usize> {
        let mut active = self.store.active.lock().await;

        // Collect first, then remove.
        let mut expired = vec![];
        for path in self.store.document_paths().await? {
            match self.store.read(&path).await {
                Ok(Some(record)) if record.is_expired_at(now, max_lifetime) => expired.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session document"),
            }
        }

        for path in &expired {
            fs::remove_file(path)
                .await
                .map_err(|e| WsmError::io(format!("removing session document {}", path.display()), e))?;
            *active = active.saturating_sub(1);
        }

        Ok(expired.len())
    }
}

#[async_trait]
impl StorageMedia for FileStorage {
    async fn initialize_session(&self, session_id: &str) -> WsmResult<SessionRef> {
        let mut active = self.store.active.lock().await;
        let path = self.store.document_path(session_id);
        let replacing = matches!(self.store.read(&path).await, Ok(Some(_)));
        self.store
            .write(&path, &SessionRecord::new(session_id))
            .await?;
        if !replacing {
            *active += 1;
        }

        debug!(session = redact(session_id), "session initialized");
        Ok(self.handle(session_id))
    }

    async fn retrieve_session(&self, session_id: &str) -> WsmResult<SessionRef> {
        let _guard = self.store.active.lock().await;
        self.store.load_existing(session_id).await?;
        Ok(self.handle(session_id))
    }

    async fn update_session_last_access(&self, session_id: &str) -> WsmResult<()> {
        self.store.modify(session_id, |_| {}).await.map(|_| ())
    }

    async fn destroy_session(&self, session_id: &str) -> WsmResult<()> {
        let mut active = self.store.active.lock().await;
        let path = self.store.document_path(session_id);
        let counted = matches!(self.store.read(&path).await, Ok(Some(_)));

        match fs::remove_file(&path).await {
            Ok(()) => {
                if counted {
                    *active = active.saturating_sub(1);
                }
                debug!(session = redact(session_id), "session destroyed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(WsmError::SessionNotExist),
            Err(e) => Err(WsmError::io(
                format!("removing session document {}", path.display()),
                e,
            )),
        }
    }

    async fn terminate_session_on_expiration(&self, max_lifetime: Duration) {
        match self.terminate_expired_at(Utc::now(), max_lifetime).await {
            Ok(0) => {}
            Ok(evicted) => info!(evicted, storage = self.name(), "expired sessions terminated"),
            Err(e) => warn!(error = %e, storage = self.name(), "expiration sweep failed"),
        }
    }

    async fn active_sessions(&self) -> u64 {
        *self.store.active.lock().await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
