//! Scheduler - "run this callback after N milliseconds".
//!
//! [`Scheduler`] is the only timing primitive the animator depends on.
//! [`TimerQueue`] implements it over a virtual clock: nothing fires until
//! the owner advances time, either from tests (exact, deterministic) or
//! from [`pipeline::run`](crate::pipeline::run) against the wall clock.
//!
//! # Example
//!
//! ```ignore
//! let queue = TimerQueue::new();
//! let handle = queue.schedule(Duration::from_millis(10), Box::new(|| println!("tick")));
//!
//! queue.advance(Duration::from_millis(5));  // nothing yet
//! queue.advance(Duration::from_millis(5));  // prints "tick"
//! assert!(!handle.is_pending());
//! ```

use std::cell::{Cell, RefCell};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Deferred work.
pub type Callback = Box<dyn FnOnce()>;

/// Invokes callbacks after a delay.
pub trait Scheduler {
    /// Run `callback` once, `delay` from now. The handle can cancel it.
    fn schedule(&self, delay: Duration, callback: Callback) -> TimerHandle;
}

// =============================================================================
// TimerHandle
// =============================================================================

/// Cancellable handle to one scheduled callback.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
    fired: Rc<Cell<bool>>,
}

impl TimerHandle {
    /// Prevent the callback from running. No effect once it has fired.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Still waiting to fire.
    pub fn is_pending(&self) -> bool {
        !self.cancelled.get() && !self.fired.get()
    }
}

// =============================================================================
// TimerQueue
// =============================================================================

struct Entry {
    due: Duration,
    seq: u64,
    callback: Callback,
    handle: TimerHandle,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Default)]
struct QueueInner {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl QueueInner {
    /// Drop cancelled entries sitting at the front.
    fn purge_cancelled(&mut self) {
        while self
            .heap
            .peek()
            .is_some_and(|Reverse(e)| e.handle.is_cancelled())
        {
            self.heap.pop();
        }
    }

    /// Pop the earliest live entry due at or before `limit`.
    fn pop_due(&mut self, limit: Duration) -> Option<Entry> {
        self.purge_cancelled();
        if self.heap.peek()?.0.due > limit {
            return None;
        }
        self.heap.pop().map(|Reverse(e)| e)
    }
}

/// Single-threaded timer queue over a virtual millisecond clock.
///
/// Clones share the same queue. Callbacks fire in deadline order, ties in
/// scheduling order, and run with no internal borrow held so they can
/// schedule further callbacks.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the queue was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of callbacks still waiting (cancelled ones excluded).
    pub fn pending(&self) -> usize {
        self.inner
            .borrow()
            .heap
            .iter()
            .filter(|Reverse(e)| !e.handle.is_cancelled())
            .count()
    }

    /// Deadline of the earliest live callback, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let mut inner = self.inner.borrow_mut();
        inner.purge_cancelled();
        inner.heap.peek().map(|Reverse(e)| e.due)
    }

    /// Move time forward by `by`, firing everything that comes due,
    /// including callbacks scheduled by callbacks within the window.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        self.advance_to(target)
    }

    /// Move time forward to `target` (no-op if it is in the past).
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            let entry = {
                let mut inner = self.inner.borrow_mut();
                match inner.pop_due(target) {
                    Some(entry) => {
                        inner.now = inner.now.max(entry.due);
                        entry
                    }
                    None => break,
                }
            };
            entry.handle.fired.set(true);
            (entry.callback)();
            fired += 1;
        }

        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
        fired
    }

    /// Jump to the next deadline and fire the callbacks due there.
    ///
    /// Returns false if nothing is scheduled.
    pub fn run_next(&self) -> bool {
        match self.next_deadline() {
            Some(due) => {
                self.advance_to(due);
                true
            }
            None => false,
        }
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let handle = TimerHandle::default();
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let due = inner.now + delay;
        inner.heap.push(Reverse(Entry {
            due,
            seq,
            callback,
            handle: handle.clone(),
        }));
        handle
    }
}

// =============================================================================
// TESTS
// =============================================================================
