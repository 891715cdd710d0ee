//! Background refresh of the unread-notification count.
//!
//! One owner spawns the poller, watchers subscribe to the latest count, and
//! teardown stops the timer instead of leaking it. A failed poll keeps the
//! last published value; an in-flight call is allowed to finish.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::ApiClient;

pub struct NotificationPoller {
    handle: Option<JoinHandle<()>>,
    stop: watch::Sender<bool>,
    counts: watch::Receiver<u64>,
}

impl NotificationPoller {
    /// Start polling on a fixed interval. The first poll happens immediately.
    pub fn spawn(client: ApiClient, interval: Duration) -> Self {
        let (count_tx, count_rx) = watch::channel(0u64);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match client.unread_notification_count().await {
                            Ok(count) => {
                                let _ = count_tx.send(count);
                            }
                            Err(err) => {
                                // stale-but-available: previous count stands
                                tracing::warn!("Notification poll failed: {}", err);
                            }
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            tracing::debug!("Notification poller stopped");
        });

        Self {
            handle: Some(handle),
            stop: stop_tx,
            counts: count_rx,
        }
    }

    /// Latest successfully fetched count (0 until the first success).
    pub fn latest(&self) -> u64 {
        *self.counts.borrow()
    }

    /// Watch for count changes, e.g. to redraw a badge.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.counts.clone()
    }

    /// Stop the poller and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        // dropping the owner must not leave a timer running
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_polls_keep_previous_value() {
        // nothing listens here, every poll fails fast
        let client = ApiClient::new("http://127.0.0.1:1/api");
        let poller = NotificationPoller::spawn(client, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(poller.latest(), 0);
        poller.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_task() {
        let client = ApiClient::new("http://127.0.0.1:1/api");
        let poller = NotificationPoller::spawn(client, Duration::from_secs(3600));
        let mut rx = poller.subscribe();
        poller.shutdown().await;
        // sender side is gone once the task exits
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_drop_aborts_without_hanging() {
        let client = ApiClient::new("http://127.0.0.1:1/api");
        let poller = NotificationPoller::spawn(client, Duration::from_secs(3600));
        drop(poller);
    }
}
