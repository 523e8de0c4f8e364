use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Stop request shared by every periodic task. The firmware never stops its tasks, but a
/// hosted run (tests, simulations) needs a clean teardown.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopState>,
}

/// Handle used to request a stop. Every `StopSignal` created from the same origin is woken.
#[derive(Clone)]
pub struct StopNotifier {
    inner: Arc<StopState>,
}

#[derive(Default)]
struct StopState {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifier(&self) -> StopNotifier {
        StopNotifier::from(self)
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for `duration` unless a stop is requested first.
    ///
    /// # Returns
    ///
    /// `true` if the caller should stop, `false` if the whole duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut stopped = self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*stopped {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            stopped = self
                .inner
                .wake
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

impl From<&StopSignal> for StopNotifier {
    fn from(value: &StopSignal) -> Self {
        Self {
            inner: value.inner.clone(),
        }
    }
}

impl StopNotifier {
    pub fn stop(&self) {
        *self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        self.inner.wake.notify_all();
    }
}
