//! Periodic expiration sweep

use crate::session::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle to the background task sweeping expired sessions
///
/// Dropping the handle leaves the task running; call [`stop`](Self::stop)
/// for a clean shutdown.
pub struct ExpirationRoutine {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl ExpirationRoutine {
    /// Spawn a sweep loop on the current tokio runtime
    ///
    /// Sweeps once immediately, then every `period`.
    pub fn spawn(manager: Arc<SessionManager>, period: Duration) -> Self {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => manager.sweep().await,
                }
            }

            debug!("expiration routine stopped");
        });

        debug!(period_secs = period.as_secs(), "expiration routine started");
        Self { shutdown, handle }
    }

    /// Token that stops the routine when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the routine and wait for the in-flight sweep, if any
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "expiration routine ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{RequestCookies, ResponseCookies};
    use crate::error::WsmResult;
    use crate::session::SessionRef;
    use crate::storage::{MemoryStorage, StorageMedia};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn first_sweep_runs_immediately_and_stop_halts() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = Arc::new(
            SessionManager::with_storage(storage.clone(), "sid", Duration::from_secs(1)).unwrap(),
        );

        let mut response = ResponseCookies::new();
        manager
            .start_session(&RequestCookies::new(), &mut response)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let routine = manager.spawn_expiration_routine();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(storage.active_sessions().await, 0);

        routine.stop().await;
    }

    /// Memory storage whose sweeps read time from the tokio clock
    struct PausedClockStorage {
        inner: MemoryStorage,
        epoch: chrono::DateTime<chrono::Utc>,
        start: tokio::time::Instant,
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl StorageMedia for PausedClockStorage {
        async fn initialize_session(&self, session_id: &str) -> WsmResult<SessionRef> {
            self.inner.initialize_session(session_id).await
        }

        async fn retrieve_session(&self, session_id: &str) -> WsmResult<SessionRef> {
            self.inner.retrieve_session(session_id).await
        }

        async fn update_session_last_access(&self, session_id: &str) -> WsmResult<()> {
            self.inner.update_session_last_access(session_id).await
        }

        async fn destroy_session(&self, session_id: &str) -> WsmResult<()> {
            self.inner.destroy_session(session_id).await
        }

        async fn terminate_session_on_expiration(&self, max_lifetime: Duration) {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap();
            self.inner
                .terminate_expired_at(self.epoch + elapsed, max_lifetime);
        }

        async fn active_sessions(&self) -> u64 {
            self.inner.active_sessions().await
        }

        fn name(&self) -> &'static str {
            "paused-clock"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_again_every_period() {
        let storage = Arc::new(PausedClockStorage {
            inner: MemoryStorage::new(),
            epoch: chrono::Utc::now(),
            start: tokio::time::Instant::now(),
            sweeps: AtomicUsize::new(0),
        });
        let manager = Arc::new(
            SessionManager::with_storage(storage.clone(), "sid", Duration::from_secs(5))
                .unwrap()
                .with_sweep_interval(Duration::from_secs(10))
                .unwrap(),
        );

        let routine = manager.spawn_expiration_routine();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(storage.sweeps.load(Ordering::SeqCst), 1);

        // created after the first sweep, expired by the second
        manager
            .start_session(&RequestCookies::new(), &mut ResponseCookies::new())
            .await
            .unwrap();
        assert_eq!(storage.active_sessions().await, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(storage.sweeps.load(Ordering::SeqCst), 2);
        assert_eq!(storage.active_sessions().await, 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(storage.sweeps.load(Ordering::SeqCst), 3);

        routine.stop().await;
    }

    #[tokio::test]
    async fn cancelling_token_ends_task() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = Arc::new(
            SessionManager::with_storage(storage, "sid", Duration::from_secs(3600)).unwrap(),
        );

        let routine = manager.spawn_expiration_routine();
        routine.shutdown_token().cancel();

        for _ in 0..50 {
            if routine.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(routine.is_finished());
    }
}
