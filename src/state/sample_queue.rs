use heapless::Deque;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

pub const SAMPLE_QUEUE_CAPACITY: usize = 8;

/// Error types related to sample queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQueueError {
    /// The queue was full and the item was dropped.
    Full,
    /// Nothing arrived before the timeout.
    Timeout,
    /// Nothing available on a non-blocking attempt.
    Empty,
}

/// Bounded FIFO carrying samples from the sole producer to its consumers.
///
/// - Sending never blocks: on a full queue the new item is dropped, queued items are kept.
/// - Peeking never removes and any number of readers may peek at once.
/// - Removing is only possible through the single [`SampleDrain`] handed out by
///   [`SampleQueue::claim_drain`].
pub struct SampleQueue<T: Copy, const N: usize = SAMPLE_QUEUE_CAPACITY> {
    items: Mutex<Deque<T, N>>,
    arrived: Condvar,
    drain_claimed: AtomicBool,
}

/// The only handle allowed to remove items from a [`SampleQueue`].
pub struct SampleDrain<T: Copy, const N: usize = SAMPLE_QUEUE_CAPACITY> {
    queue: Arc<SampleQueue<T, N>>,
}

impl<T: Copy, const N: usize> SampleQueue<T, N> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Deque::new()),
            arrived: Condvar::new(),
            drain_claimed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Deque<T, N>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Attempts to append an item without blocking.
    ///
    /// # Errors
    ///
    /// - `SampleQueueError::Full`: the queue already holds `N` items. The item is dropped.
    pub fn try_send(&self, item: T) -> Result<(), SampleQueueError> {
        self.lock()
            .push_back(item)
            .map_err(|_| SampleQueueError::Full)?;
        self.arrived.notify_all();
        Ok(())
    }

    /// Returns a copy of the oldest item without removing it, waiting up to `timeout` for
    /// one to arrive. `None` waits until an item arrives.
    ///
    /// # Errors
    ///
    /// - `SampleQueueError::Empty`: `timeout` was zero and the queue was empty.
    /// - `SampleQueueError::Timeout`: nothing arrived before the timeout.
    pub fn peek_oldest(&self, timeout: Option<Duration>) -> Result<T, SampleQueueError> {
        self.wait_for(timeout, |items| items.front().copied())
    }

    /// Same as [`SampleQueue::peek_oldest`] but returns the most recently sent item.
    pub fn peek_latest(&self, timeout: Option<Duration>) -> Result<T, SampleQueueError> {
        self.wait_for(timeout, |items| items.back().copied())
    }

    /// Claims the removing side of the queue. Only the first call gets a handle.
    pub fn claim_drain(self: &Arc<Self>) -> Option<SampleDrain<T, N>> {
        self.drain_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SampleDrain {
                queue: self.clone(),
            })
    }

    fn wait_for<F>(&self, timeout: Option<Duration>, mut take: F) -> Result<T, SampleQueueError>
    where
        F: FnMut(&mut Deque<T, N>) -> Option<T>,
    {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut items = self.lock();
        loop {
            if let Some(item) = take(&mut *items) {
                return Ok(item);
            }
            items = match deadline {
                None => self
                    .arrived
                    .wait(items)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(match timeout {
                            Some(timeout) if timeout.is_zero() => SampleQueueError::Empty,
                            _ => SampleQueueError::Timeout,
                        });
                    }
                    self.arrived
                        .wait_timeout(items, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

impl<T: Copy, const N: usize> Default for SampleQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> SampleDrain<T, N> {
    /// Removes the oldest item, waiting up to `timeout` for one to arrive.
    ///
    /// # Errors
    ///
    /// - `SampleQueueError::Empty`: `timeout` was zero and the queue was empty.
    /// - `SampleQueueError::Timeout`: nothing arrived before the timeout.
    pub fn receive_timeout(&mut self, timeout: Duration) -> Result<T, SampleQueueError> {
        self.queue.wait_for(Some(timeout), |items| items.pop_front())
    }

    /// Attempts to remove the oldest item without blocking.
    pub fn try_receive(&mut self) -> Result<T, SampleQueueError> {
        self.receive_timeout(Duration::ZERO)
    }
}
