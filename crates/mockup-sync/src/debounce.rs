//! Debounced task scheduling.
//!
//! Each `schedule` replaces the pending payload and restarts the quiescence
//! window; only the last payload of a burst reaches the action.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
    /// Incremented on every schedule; a timer only fires its own tick
    tick: u64,
    payload: Option<T>,
    timer: Option<JoinHandle<()>>,
}

/// Last-write-wins debouncer running its action on the tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    action: Action<T>,
    pending: Arc<Mutex<Pending<T>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(Pending {
                tick: 0,
                payload: None,
                timer: None,
            })),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending payload and restart the timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, payload: T) {
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.tick += 1;
        pending.payload = Some(payload);

        let tick = pending.tick;
        let delay = self.delay;
        let slot = Arc::clone(&self.pending);
        let action = Arc::clone(&self.action);
        pending.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let payload = {
                let mut pending = lock(&slot);
                if pending.tick != tick {
                    return;
                }
                pending.timer = None;
                pending.payload.take()
            };
            if let Some(payload) = payload {
                action(payload);
            }
        }));
    }

    /// Run the pending action now. Returns false when nothing was pending.
    pub fn flush(&self) -> bool {
        let payload = {
            let mut pending = lock(&self.pending);
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
            pending.tick += 1;
            pending.payload.take()
        };
        match payload {
            Some(payload) => {
                (self.action)(payload);
                true
            }
            None => false,
        }
    }

    /// Drop the pending payload without running the action.
    pub fn cancel(&self) -> bool {
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.tick += 1;
        pending.payload.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).payload.is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
