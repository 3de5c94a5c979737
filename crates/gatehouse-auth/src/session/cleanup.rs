//! Periodic removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use gatehouse_core::result::AppResult;
use gatehouse_entity::session::SessionStore;

/// Deletes expired sessions of every identity.
///
/// Deletion is a single delete-where-expired, so a cycle may overlap with
/// logins and refreshes.
#[derive(Clone)]
pub struct SessionCleanup {
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup").finish()
    }
}

impl SessionCleanup {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Run one cleanup cycle. Returns the number of deleted sessions.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let deleted = self.sessions.delete_expired(None).await?;
        if deleted > 0 {
            info!(deleted, "Session cleanup completed");
        } else {
            debug!("Session cleanup found nothing to delete");
        }
        Ok(deleted)
    }

    /// Run a cycle every `interval` until `shutdown` flips to `true`.
    pub fn spawn(self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "Session cleanup task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            error!(error = %e, "Session cleanup failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Session cleanup task stopped");
        })
    }
}
