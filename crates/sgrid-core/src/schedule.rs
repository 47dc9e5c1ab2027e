//! Cancellable debounce.
//!
//! Each call to [`Debouncer::schedule`] cancels the handle issued before it,
//! so only the last request inside a quiet window gets to run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct HandleState {
    cancelled: Cell<bool>,
    notify: Notify,
}

/// One scheduled run. Cancelled by the next schedule or explicitly.
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    state: Rc<HandleState>,
    delay: Duration,
}

impl DebounceHandle {
    pub fn cancel(&self) {
        if !self.state.cancelled.replace(true) {
            // Stores a permit if nobody is waiting yet.
            self.state.notify.notify_one();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Wait out the delay. Returns false if the handle was cancelled first.
    pub async fn ready(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(self.delay) => !self.is_cancelled(),
            () = self.state.notify.notified() => false,
        }
    }
}

/// Issues debounce handles, keeping only the newest one live.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: RefCell<Option<DebounceHandle>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the pending handle (if any) and issue a new one.
    pub fn schedule(&self) -> DebounceHandle {
        let handle = DebounceHandle {
            state: Rc::new(HandleState::default()),
            delay: self.delay,
        };
        if let Some(previous) = self.pending.replace(Some(handle.clone())) {
            previous.cancel();
        }
        handle
    }

    /// Cancel the pending handle without issuing a new one.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn handle_fires_after_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();
        assert!(debouncer.schedule().ready().await);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_schedule_cancels_older() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let first = debouncer.schedule();
        let second = debouncer.schedule();
        let (a, b) = tokio::join!(first.ready(), second.ready());
        assert!(!a);
        assert!(b);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_waiting() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let handle = debouncer.schedule();
        let (fired, ()) = tokio::join!(handle.ready(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            debouncer.cancel();
        });
        assert!(!fired);
        assert!(handle.is_cancelled());
    }
}
