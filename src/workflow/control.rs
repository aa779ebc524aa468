//! Cooperative pause/cancel handle for a running workflow.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Signal {
    paused: bool,
    cancelled: bool,
}

/// Cloneable handle that pauses, resumes or cancels a run.
///
/// The orchestrator checks the handle before each stage. An in-flight model
/// call is never interrupted; the request takes effect at the next stage
/// boundary.
#[derive(Debug, Clone)]
pub struct RunControl {
    tx: Arc<watch::Sender<Signal>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    /// Creates a handle in the running (not paused, not cancelled) state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Signal::default());
        Self { tx: Arc::new(tx) }
    }

    /// Holds the run before its next stage.
    pub fn pause(&self) {
        self.tx.send_modify(|s| s.paused = true);
    }

    /// Releases a held run.
    pub fn resume(&self) {
        self.tx.send_modify(|s| s.paused = false);
    }

    /// Stops the run before its next stage. Also releases a held run.
    pub fn cancel(&self) {
        self.tx.send_modify(|s| s.cancelled = true);
    }

    /// Clears pause and cancel so the handle can drive a new run.
    pub fn reset(&self) {
        self.tx.send_replace(Signal::default());
    }

    /// Returns `true` while a pause is requested.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.tx.borrow().paused
    }

    /// Returns `true` once cancel was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().cancelled
    }

    /// Waits until the run is resumed or cancelled.
    ///
    /// Returns immediately when not paused. Returns `true` if the run was
    /// cancelled.
    pub async fn wait_while_paused(&self) -> bool {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|s| !s.paused || s.cancelled).await {
            Ok(signal) => signal.cancelled,
            Err(_) => self.is_cancelled(),
        }
    }
}
