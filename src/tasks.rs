//! Handles for the crate's background tasks.

use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

/// Owns a spawned task and the signal that tells it to stop.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawns `task`, passing it a receiver that flips to `true` on shutdown.
    pub fn spawn<F, Fut>(name: &'static str, task: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (shutdown, signal) = watch::channel(false);
        let join = tokio::spawn(task(signal));
        Self {
            name,
            shutdown,
            join,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signals the task and waits for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.join.await {
            debug!(task = self.name, "background task ended abnormally: {err}");
        }
    }
}

/// Resolves once shutdown has been requested or the handle is gone.
pub(crate) async fn stopped(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow_and_update() {
        if signal.changed().await.is_err() {
            return;
        }
    }
}
