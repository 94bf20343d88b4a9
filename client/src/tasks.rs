//! Cancellable scheduled tasks
//!
//! Recurring work (the per-minute reminder check, the per-second rest
//! tick) is owned by the screen or feature that started it. Owning a
//! [`ScheduledTask`] guarantees the underlying task stops when the
//! owner lets go of it, so timers never fire against stale state.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Abort-on-drop handle to a spawned recurring task.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn `tick` every `period`, starting one period from now.
    pub fn every<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of a tokio interval completes immediately;
            // consume it so the schedule starts one period out.
            interval.tick().await;
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    /// Spawn a long-running future with the same abort-on-drop
    /// ownership as a periodic task.
    pub fn spawn<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Stop the task now instead of waiting for drop.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
