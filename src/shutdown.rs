//! Teardown coordination between the mirror handle and its worker tasks.
//!
//! A single `tokio::sync::watch` channel carries the shutdown flag. Every
//! worker holds a [`ShutdownSignal`] and selects on [`ShutdownSignal::raised`]
//! next to its real work; the owning handle raises the flag once via
//! [`ShutdownController::raise`]. A dropped controller counts as raised, so
//! workers never outlive a handle that was dropped without an explicit
//! shutdown.

use tokio::sync::watch;

/// Creates a connected controller/signal pair.
#[must_use]
pub fn channel() -> (ShutdownController, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownController { tx }, ShutdownSignal { rx })
}

/// Owning side of the shutdown flag.
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    /// Raises the shutdown flag. Harmless if already raised.
    pub fn raise(&self) {
        let _ = self.tx.send(true);
    }
}

/// Worker-side view of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested (or the controller is gone).
    pub async fn raised(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Controller dropped: treat as shutdown.
                return;
            }
        }
    }
}
