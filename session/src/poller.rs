//! Fixed-interval pollers with an explicit "still active" flag.
//!
//! A poller runs once immediately, then on every interval tick, until its
//! handle is stopped or dropped. Stopping never cancels a request that is
//! already in flight; instead the [`ActiveFlag`] flips to false and the task
//! is expected to check it before touching shared state.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use workspace_core::error::Result;

/// Read side of a poller's activation state
#[derive(Debug, Clone)]
pub struct ActiveFlag(watch::Receiver<bool>);

impl ActiveFlag {
    pub fn is_active(&self) -> bool {
        *self.0.borrow()
    }
}

/// One unit of periodic work
#[async_trait]
pub trait PollTask: Send + 'static {
    fn name(&self) -> &'static str;

    /// Run one poll. Errors are logged by the poller and polling continues
    /// on the next tick; there is no backoff.
    async fn poll(&mut self, active: &ActiveFlag) -> Result<()>;
}

/// Owner of a running poller; dropping it tears the poller down
#[derive(Debug)]
pub struct PollerHandle {
    name: &'static str,
    active: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Clear the active flag. Idempotent.
    pub fn stop(&self) {
        if self.active.send_replace(false) {
            debug!(poller = self.name, "Poller stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// True once the loop has exited, which may lag `stop` by one
    /// in-flight poll
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start `task` on a fixed `interval`, polling once immediately.
pub fn spawn_poller<T: PollTask>(mut task: T, interval: Duration) -> PollerHandle {
    let name = task.name();
    let (tx, rx) = watch::channel(true);
    let flag = ActiveFlag(rx.clone());

    let handle = tokio::spawn(async move {
        let mut stop_rx = rx;
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stopped(&mut stop_rx) => break,
                _ = ticker.tick() => {}
            }

            // Awaited outside the select so teardown never cancels it
            if let Err(e) = task.poll(&flag).await {
                warn!(poller = name, error = %e, "Poll failed, keeping last known state");
            }

            if !flag.is_active() {
                break;
            }
        }
        debug!(poller = name, "Poller loop exited");
    });

    debug!(poller = name, ?interval, "Poller started");
    PollerHandle {
        name,
        active: tx,
        task: handle,
    }
}

async fn stopped(rx: &mut watch::Receiver<bool>) {
    loop {
        if !*rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use workspace_core::error::WorkspaceError;

    struct Counting {
        calls: Arc<Mutex<u32>>,
        fail: bool,
    }

    #[async_trait]
    impl PollTask for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn poll(&mut self, _active: &ActiveFlag) -> Result<()> {
            *self.calls.lock() += 1;
            if self.fail {
                return Err(WorkspaceError::store("offline"));
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let calls = Arc::new(Mutex::new(0));
        let handle = spawn_poller(
            Counting {
                calls: calls.clone(),
                fail: false,
            },
            Duration::from_secs(2),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*calls.lock(), 1);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(*calls.lock(), 3);
        assert!(handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_polling() {
        let calls = Arc::new(Mutex::new(0));
        let _handle = spawn_poller(
            Counting {
                calls: calls.clone(),
                fail: true,
            },
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(*calls.lock(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down() {
        let calls = Arc::new(Mutex::new(0));
        let handle = spawn_poller(
            Counting {
                calls: calls.clone(),
                fail: false,
            },
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*calls.lock(), 1);
    }
}
