use crate::channels::{Channel, ChannelMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Keep `ch.listen` running until `tx` closes or `cancel` fires, restarting
/// it with exponential backoff after every exit.
pub fn spawn_supervised_listener(
    ch: Arc<dyn Channel>,
    tx: tokio::sync::mpsc::Sender<ChannelMessage>,
    initial_backoff: Duration,
    max_backoff: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let initial_backoff = initial_backoff.max(Duration::from_millis(1));
        let max_backoff = max_backoff.max(initial_backoff);
        let mut backoff = initial_backoff;

        loop {
            tracing::debug!(channel = ch.name(), "listener starting");
            let result = tokio::select! {
                () = cancel.cancelled() => break,
                result = ch.listen(tx.clone()) => result,
            };

            if tx.is_closed() || cancel.is_cancelled() {
                break;
            }

            match result {
                Ok(()) => {
                    tracing::warn!(channel = ch.name(), "listener exited; restarting");
                    backoff = initial_backoff;
                }
                Err(e) => {
                    tracing::error!(channel = ch.name(), error = %format!("{e:#}"), "listener failed; restarting");
                }
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(backoff) => {}
            }
            // First failure waits the initial backoff.
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
        tracing::debug!(channel = ch.name(), "listener stopped");
    })
}
