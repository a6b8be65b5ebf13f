use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::auth::persist_token;
use crate::auth::session::{RefreshOutcome, Session};
use crate::host::api::HostHandle;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// The background token-refresh timer. At most one task is active:
/// starting again aborts the predecessor first, and `stop` tears the task
/// down with the plugin.
pub struct RefreshScheduler {
    task: Mutex<Option<JoinHandle<()>>>,
    active: Arc<AtomicUsize>,
}

struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            task: Mutex::new(None),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start the recurring refresh check, cancelling any prior timer.
    pub fn start(&self, session: Arc<Session>, host: Arc<dyn HostHandle>) {
        let guard = ActiveGuard::new(self.active.clone());
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
            loop {
                ticker.tick().await;
                match session.refresh_if_due().await {
                    Ok(RefreshOutcome::NotDue) => {}
                    Ok(RefreshOutcome::Refreshed(token)) => {
                        persist_token(host.as_ref(), &token).await;
                    }
                    Err(e) => {
                        // Previous token stays installed; it may go stale
                        // and vendor calls will surface auth errors.
                        warn!(error = %e, "token refresh failed");
                    }
                }
            }
        });

        let mut slot = self.task.lock().expect("scheduler lock poisoned");
        if let Some(prev) = slot.replace(handle) {
            prev.abort();
        }
    }

    pub fn stop(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Number of live timer tasks. Aborted tasks leave the count once
    /// their drop guard runs.
    pub fn active_tasks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::host::api::NullHost;

    fn parts() -> (Arc<Session>, Arc<dyn HostHandle>) {
        (
            Arc::new(Session::new(PluginConfig::default())),
            Arc::new(NullHost),
        )
    }

    #[tokio::test]
    async fn start_spawns_one_task() {
        let scheduler = RefreshScheduler::new();
        let (session, host) = parts();
        scheduler.start(session, host);
        assert_eq!(scheduler.active_tasks(), 1);
        scheduler.stop();
    }

    #[tokio::test]
    async fn restart_leaves_exactly_one_task() {
        let scheduler = RefreshScheduler::new();
        let (session, host) = parts();
        scheduler.start(session.clone(), host.clone());
        scheduler.start(session, host);
        // Let the aborted predecessor unwind.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.active_tasks(), 1);
        scheduler.stop();
    }

    #[tokio::test]
    async fn stop_tears_down_the_task() {
        let scheduler = RefreshScheduler::new();
        let (session, host) = parts();
        scheduler.start(session, host);
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[tokio::test]
    async fn stop_without_start_is_a_noop() {
        let scheduler = RefreshScheduler::new();
        scheduler.stop();
        assert_eq!(scheduler.active_tasks(), 0);
    }
}
