use std::time::Duration;

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::alerts::AlertCenter;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic alert refresh for one logged-in view.
pub struct AlertMonitor;

impl AlertMonitor {
    /// Spawns the polling task. The first refresh happens immediately.
    ///
    /// Must be called from within a tokio runtime. Polling stops when the
    /// returned handle is cancelled or dropped.
    pub fn start(center: AlertCenter, every: Duration) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (unread_tx, unread_rx) = watch::channel(0usize);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if center.refresh().await {
                            unread_tx.send_replace(center.unread_count().await);
                        }
                    }
                }
            }
            tracing::debug!("alert monitor stopped");
        });

        tracing::debug!("alert monitor started, every {}s", every.as_secs());
        MonitorHandle {
            stop: Some(stop_tx),
            task: Some(task),
            unread: unread_rx,
        }
    }
}

/// Owner of a running [`AlertMonitor`].
#[derive(Debug)]
pub struct MonitorHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    unread: watch::Receiver<usize>,
}

impl MonitorHandle {
    /// Unread count after each successful poll.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.unread.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops polling and waits for an in-flight refresh to finish. No poll
    /// starts after this returns.
    pub async fn cancel(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
            && !err.is_cancelled()
        {
            tracing::error!("alert monitor task failed: {err}");
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
