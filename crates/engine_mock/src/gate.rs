//! Hold gate for blocking engine calls from tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct GateState {
    closed: Mutex<bool>,
    changed: Condvar,
    waiting: AtomicUsize,
}

/// Shared open/closed latch. Engine calls pass an open gate immediately and
/// block on a closed one until it opens.
#[derive(Debug, Clone, Default)]
pub struct UpdateGate {
    state: Arc<GateState>,
}

impl UpdateGate {
    /// Gate that starts open
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        *self.lock() = true;
    }

    pub fn open(&self) {
        *self.lock() = false;
        self.state.changed.notify_all();
    }

    pub fn is_open(&self) -> bool {
        !*self.lock()
    }

    /// Callers currently blocked in [`UpdateGate::pass`]
    pub fn waiting(&self) -> usize {
        self.state.waiting.load(Ordering::SeqCst)
    }

    /// Block until some caller is waiting, or `timeout` elapses.
    ///
    /// Returns `true` if a caller is waiting.
    pub fn wait_for_caller(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while self.waiting() == 0 {
            if std::time::Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Return once the gate is open
    pub fn pass(&self) {
        let mut closed = self.lock();
        if !*closed {
            return;
        }
        self.state.waiting.fetch_add(1, Ordering::SeqCst);
        while *closed {
            closed = self
                .state
                .changed
                .wait(closed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.state.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.state
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
