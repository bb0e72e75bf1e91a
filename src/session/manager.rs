//! Session lifecycle management
//!
//! Binds the session cookie to a session in the configured storage media,
//! ends sessions on logout, and sweeps expired sessions.

use crate::config::{Config, ConfigManager, StorageConfig};
use crate::cookie::{Cookie, CookieSink, CookieSource};
use crate::error::{WsmError, WsmResult};
use crate::session::expiration::ExpirationRoutine;
use crate::session::id::{self, redact};
use crate::session::SessionRef;
use crate::storage::{self, StorageKind, StorageMediaRef};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Session manager handles cookie binding, logout and expiration
///
/// Every operation touching storage holds the manager lock, so start, end
/// and sweep never run concurrently with each other.
pub struct SessionManager {
    lock: Mutex<()>,
    cookie_name: String,
    storage: StorageMediaRef,
    max_lifetime: Duration,
    sweep_interval: Duration,
}

impl SessionManager {
    /// Create a session manager over a named storage media type
    ///
    /// Fails with `UnsupportedStorageType` for unknown names.
    pub async fn new(
        storage_type: &str,
        cookie_name: &str,
        max_lifetime_secs: u64,
        storage_config: &StorageConfig,
    ) -> WsmResult<Self> {
        let kind: StorageKind = storage_type.parse()?;
        let max_lifetime = Duration::from_secs(max_lifetime_secs);
        validate(cookie_name, max_lifetime)?;

        if storage_config.track_registration {
            storage::register(&ConfigManager::registration_path(storage_config), kind).await?;
        }

        let storage = storage::create_storage(kind, storage_config).await?;
        info!(storage = kind.name(), cookie = cookie_name, "session manager ready");
        Self::with_storage(storage, cookie_name, max_lifetime)
    }

    /// Create a session manager from loaded configuration
    pub async fn from_config(config: &Config) -> WsmResult<Self> {
        let manager = Self::new(
            &config.storage.kind,
            &config.session.cookie_name,
            config.session.max_lifetime_secs,
            &config.storage,
        )
        .await?;
        manager.with_sweep_interval(config.session.sweep_interval())
    }

    /// Create a session manager over an existing storage media
    pub fn with_storage(
        storage: StorageMediaRef,
        cookie_name: &str,
        max_lifetime: Duration,
    ) -> WsmResult<Self> {
        validate(cookie_name, max_lifetime)?;
        Ok(Self {
            lock: Mutex::new(()),
            cookie_name: cookie_name.to_string(),
            storage,
            max_lifetime,
            sweep_interval: max_lifetime,
        })
    }

    /// Override the period of the expiration routine
    pub fn with_sweep_interval(mut self, interval: Duration) -> WsmResult<Self> {
        if interval.is_zero() {
            return Err(WsmError::InvalidSetting(
                "sweep interval must be at least one second".to_string(),
            ));
        }
        self.sweep_interval = interval;
        Ok(self)
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Maximum idle lifetime of a session
    pub fn max_lifetime(&self) -> Duration {
        self.max_lifetime
    }

    /// Period of the expiration routine
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// The storage media this manager owns
    pub fn storage(&self) -> &StorageMediaRef {
        &self.storage
    }

    /// Return the client's session, creating one if no cookie was sent
    ///
    /// A cookie naming an unknown session yields `SessionNotExist`, and a
    /// cookie that cannot be decoded yields `MalformedCookie`; neither starts
    /// a new session on its own (see [`WsmError::warrants_new_session`]).
    pub async fn start_session(
        &self,
        request: &impl CookieSource,
        response: &mut impl CookieSink,
    ) -> WsmResult<SessionRef> {
        let _guard = self.lock.lock().await;

        match request.cookie(&self.cookie_name).filter(|v| !v.is_empty()) {
            None => self.create_session(response).await,
            Some(value) => {
                let session_id = id::unescape(value)?;
                let session = self.storage.retrieve_session(&session_id).await?;
                self.storage.update_session_last_access(&session_id).await?;
                debug!(session = redact(&session_id), "session resumed");
                Ok(session)
            }
        }
    }

    /// Issue a brand-new session regardless of the request's cookie
    pub async fn issue_session(&self, response: &mut impl CookieSink) -> WsmResult<SessionRef> {
        let _guard = self.lock.lock().await;
        self.create_session(response).await
    }

    async fn create_session(&self, response: &mut impl CookieSink) -> WsmResult<SessionRef> {
        let session_id = id::generate_session_id()?;
        let session = self.storage.initialize_session(&session_id).await?;

        response.set_cookie(Cookie::session(
            &self.cookie_name,
            id::escape(&session_id),
            self.max_lifetime.as_secs() as i64,
        ));

        debug!(session = redact(&session_id), "session started");
        Ok(session)
    }

    /// End the client's session and expire its cookie
    ///
    /// Without a usable cookie this does nothing. A session already gone
    /// from storage is not an error.
    pub async fn end_session(&self, request: &impl CookieSource, response: &mut impl CookieSink) {
        let Some(value) = request.cookie(&self.cookie_name).filter(|v| !v.is_empty()) else {
            return;
        };
        let Ok(session_id) = id::unescape(value) else {
            debug!("ignoring undecodable session cookie on logout");
            return;
        };

        let _guard = self.lock.lock().await;
        match self.storage.destroy_session(&session_id).await {
            Ok(()) => debug!(session = redact(&session_id), "session ended"),
            Err(WsmError::SessionNotExist) => {
                debug!(session = redact(&session_id), "session already gone")
            }
            Err(e) => warn!(error = %e, "failed to destroy session"),
        }

        response.set_cookie(Cookie::expired(&self.cookie_name));
    }

    /// Run one expiration pass over the storage media
    pub async fn sweep(&self) {
        let _guard = self.lock.lock().await;
        self.storage
            .terminate_session_on_expiration(self.max_lifetime)
            .await;
    }

    /// Spawn the periodic expiration routine
    ///
    /// The first sweep runs immediately. The routine lives until
    /// [`ExpirationRoutine::stop`] is called.
    pub fn spawn_expiration_routine(self: &Arc<Self>) -> ExpirationRoutine {
        ExpirationRoutine::spawn(Arc::clone(self), self.sweep_interval)
    }
}

fn validate(cookie_name: &str, max_lifetime: Duration) -> WsmResult<()> {
    if max_lifetime.as_secs() == 0 {
        return Err(WsmError::InvalidSetting(
            "max lifetime must be at least one second".to_string(),
        ));
    }
    if max_lifetime.as_secs() > i64::MAX as u64 {
        return Err(WsmError::InvalidSetting("max lifetime is too large".to_string()));
    }

    let valid_name = !cookie_name.is_empty()
        && cookie_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !valid_name {
        return Err(WsmError::InvalidSetting(format!(
            "invalid cookie name: {:?}",
            cookie_name
        )));
    }

    Ok(())
}
