use crate::channels::{Channel, ChatId, SendOptions};
use crate::session::{SessionStore, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodically evicts idle sessions and, when configured, tells the user.
pub struct ExpirySweeper {
    store: Arc<SessionStore>,
    channel: Arc<dyn Channel>,
    idle_timeout: chrono::Duration,
    notify: bool,
}

impl ExpirySweeper {
    pub fn new(
        store: Arc<SessionStore>,
        channel: Arc<dyn Channel>,
        idle_timeout: chrono::Duration,
        notify: bool,
    ) -> Self {
        Self {
            store,
            channel,
            idle_timeout,
            notify,
        }
    }

    /// One sweep at `now`. Notification failures are logged and skipped.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Vec<UserId> {
        let evicted = self.store.sweep_expired(self.idle_timeout, now);
        for identity in &evicted {
            tracing::info!(user = %identity, "conversation expired");
            if !self.notify {
                continue;
            }
            let text = t!("bot.context_cleared");
            if let Err(e) = self
                .channel
                .send(&text, ChatId::from(*identity), SendOptions::default())
                .await
            {
                tracing::warn!(user = %identity, error = %format!("{e:#}"), "expiry notification failed");
            }
        }
        evicted
    }

    pub fn spawn(self, period: Duration, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.sweep_once(Utc::now()).await;
                    }
                }
            }
            tracing::debug!("expiry sweeper stopped");
        })
    }
}
