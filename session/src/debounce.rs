//! Quiet-period debouncer: a burst of events collapses into one callback
//! carrying the latest value, fired once nothing arrived for `quiet`.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default quiet period for layout recomputation
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(150);

/// Debounced event sink. Dropping it disposes the pending event, if any.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn<F>(quiet: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut latest = first;
                loop {
                    match tokio::time::timeout(quiet, rx.recv()).await {
                        Ok(Some(next)) => latest = next,
                        Ok(None) => return,
                        Err(_) => break,
                    }
                }
                on_settle(latest);
            }
        });

        Self { tx, task }
    }

    /// Record an event; restarts the quiet period
    pub fn push(&self, value: T) {
        // Fails only after disposal
        let _ = self.tx.send(value);
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
