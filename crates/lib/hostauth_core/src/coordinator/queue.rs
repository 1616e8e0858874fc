//! FIFO queue of requests suspended on an in-flight refresh.

use std::collections::VecDeque;

use crate::error::RefreshFailure;

/// What a suspended request receives when the refresh settles: the new
/// access token, or the reason there is none.
pub type RefreshOutcome = Result<String, RefreshFailure>;

type Continuation = Box<dyn FnOnce(RefreshOutcome) + Send>;

/// Continuations waiting for the current refresh, in arrival order.
#[derive(Default)]
pub struct PendingQueue {
    waiters: VecDeque<Continuation>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a continuation. Each one is called exactly once.
    pub fn push<F>(&mut self, continuation: F)
    where
        F: FnOnce(RefreshOutcome) + Send + 'static,
    {
        self.waiters.push_back(Box::new(continuation));
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Move every waiter out, leaving the queue empty.
    ///
    /// Release happens on the returned value so callers can drop their lock
    /// before running continuations.
    pub fn take(&mut self) -> Drained {
        Drained(std::mem::take(&mut self.waiters))
    }
}

impl std::fmt::Debug for PendingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingQueue")
            .field("len", &self.waiters.len())
            .finish()
    }
}

/// Waiters removed from a [`PendingQueue`], not yet released.
#[must_use = "drained waiters must be released"]
pub struct Drained(VecDeque<Continuation>);

impl Drained {
    /// Call every continuation with `outcome`, oldest first. Returns how many
    /// were released.
    pub fn release(self, outcome: &RefreshOutcome) -> usize {
        let count = self.0.len();
        for continuation in self.0 {
            continuation(outcome.clone());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn release_is_fifo() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut queue = PendingQueue::new();
        for i in 1..=3 {
            let order = order.clone();
            queue.push(move |outcome| {
                assert_eq!(outcome.as_deref(), Ok("tok"));
                order.lock().unwrap().push(i);
            });
        }

        let released = queue.take().release(&Ok("tok".to_string()));

        assert_eq!(released, 3);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn take_empties_queue() {
        let mut queue = PendingQueue::new();
        queue.push(|_| {});
        queue.push(|_| {});
        assert_eq!(queue.len(), 2);

        let drained = queue.take();
        assert!(queue.is_empty());
        assert_eq!(drained.release(&Err(RefreshFailure::Abandoned)), 2);
    }

    #[test]
    fn rejection_reaches_every_waiter() {
        let rejected = Arc::new(Mutex::new(0));
        let mut queue = PendingQueue::new();
        for _ in 0..4 {
            let rejected = rejected.clone();
            queue.push(move |outcome| {
                if outcome.is_err() {
                    *rejected.lock().unwrap() += 1;
                }
            });
        }
        queue.take().release(&Err(RefreshFailure::Abandoned));
        assert_eq!(*rejected.lock().unwrap(), 4);
    }
}
