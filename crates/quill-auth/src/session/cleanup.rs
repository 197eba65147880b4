//! Periodic purge of expired refresh token records.
//!
//! Expired records already fail verification, so this only reclaims space.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use quill_core::result::AppResult;

use crate::store::RefreshTokenStore;

/// Removes refresh token records whose expiry has passed.
#[derive(Clone)]
pub struct TokenCleanup {
    tokens: Arc<dyn RefreshTokenStore>,
}

impl std::fmt::Debug for TokenCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCleanup").finish()
    }
}

impl TokenCleanup {
    /// Creates a cleanup job over the given store.
    pub fn new(tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self { tokens }
    }

    /// Run one purge pass. Returns the number of records removed.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let removed = self.tokens.purge_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!(removed, "Purged expired refresh tokens");
        } else {
            tracing::debug!("No expired refresh tokens to purge");
        }
        Ok(removed)
    }

    /// Runs [`TokenCleanup::run_cleanup`] every `interval` until `cancel`
    /// flips to `true`. A failed pass is logged and retried next tick.
    pub fn spawn(self, interval: Duration, mut cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                interval_seconds = interval.as_secs(),
                "Refresh token cleanup started"
            );

            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            tracing::warn!(error = %e, "Refresh token cleanup failed");
                        }
                    }
                }
            }

            tracing::info!("Refresh token cleanup stopped");
        })
    }
}
