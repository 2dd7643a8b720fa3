//! Mount API - drive a timer queue against the wall clock.
//!
//! A [`TimerQueue`] only moves when told to. Mounting it pins its virtual
//! clock to `Instant::now()`; each [`tick`] then advances the queue to the
//! real elapsed time, firing every animator step that has come due.
//!
//! # Example
//!
//! ```ignore
//! use spark_typewriter::pipeline::mount;
//!
//! let queue = TimerQueue::new();
//! spawn_typing(Some(surface), lines, config, queue.clone());
//!
//! let handle = mount::mount(queue);
//!
//! // Option 1: block until stopped or nothing is left to run
//! mount::run(&handle);
//!
//! // Option 2: tick manually in your own loop
//! while mount::tick(&handle) > 0 || handle.is_running() {
//!     // Your logic here
//! }
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::TimerQueue;

/// Longest single wait between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds the queue, the wall-clock instant its virtual time zero maps to,
/// and the running flag (cleared by [`MountHandle::stop`]).
#[derive(Debug)]
pub struct MountHandle {
    queue: TimerQueue,
    epoch: Instant,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl MountHandle {
    pub fn queue(&self) -> &TimerQueue {
        &self.queue
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop (sets running to false).
    ///
    /// Animators keep their state; nothing fires until the queue is
    /// driven again.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Shared running flag, for stopping from a signal handler or thread.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Virtual time that corresponds to now.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// How long to wait before the next tick: time to the next deadline,
    /// capped by the poll interval. `None` when nothing is scheduled.
    pub fn next_wait(&self) -> Option<Duration> {
        let deadline = self.queue.next_deadline()?;
        let wait = deadline.saturating_sub(self.elapsed());
        Some(wait.min(self.poll_interval))
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Pin `queue`'s virtual clock to the wall clock.
///
/// Time already elapsed on the queue counts as elapsed wall time, so a
/// queue that was advanced manually before mounting does not jump.
pub fn mount(queue: TimerQueue) -> MountHandle {
    let now = Instant::now();
    let epoch = now.checked_sub(queue.now()).unwrap_or(now);
    tracing::debug!(target: "typewriter::mount", pending = queue.pending(), "mounted");

    MountHandle {
        queue,
        epoch,
        running: Arc::new(AtomicBool::new(true)),
        poll_interval: DEFAULT_POLL_INTERVAL,
    }
}

// =============================================================================
// Event Loop
// =============================================================================

/// Advance the queue to the current wall time.
///
/// Returns the number of callbacks fired; zero once stopped.
pub fn tick(handle: &MountHandle) -> usize {
    if !handle.is_running() {
        return 0;
    }
    handle.queue.advance_to(handle.elapsed())
}

/// Run until stopped or until nothing is scheduled, using `wait` to block
/// between ticks.
///
/// `wait` receives the suggested wait and returns `Ok(false)` to stop,
/// so a caller can poll terminal input instead of sleeping.
///
/// # Errors
///
/// Whatever `wait` returns.
pub fn run_with(
    handle: &MountHandle,
    mut wait: impl FnMut(Duration) -> io::Result<bool>,
) -> io::Result<()> {
    while handle.is_running() {
        let Some(delay) = handle.next_wait() else {
            tracing::debug!(target: "typewriter::mount", "queue drained");
            break;
        };
        if !wait(delay)? {
            handle.stop();
            break;
        }
        tick(handle);
    }
    Ok(())
}

/// Run the loop with plain sleeps (blocking until stopped or drained).
pub fn run(handle: &MountHandle) {
    let _ = run_with(handle, |delay| {
        thread::sleep(delay);
        Ok(true)
    });
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Scheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_run_fires_and_drains() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(0));
        for delay in [1, 3, 5] {
            let fired = fired.clone();
            queue.schedule(Duration::from_millis(delay), Box::new(move || fired.set(fired.get() + 1)));
        }

        let handle = mount(queue);
        run(&handle);

        assert_eq!(fired.get(), 3);
        assert_eq!(handle.queue().pending(), 0);
        assert!(handle.queue().now() >= Duration::from_millis(5));
    }

    #[test]
    fn test_wait_can_stop() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        queue.schedule(Duration::from_secs(60), Box::new(move || fired_clone.set(true)));

        let handle = mount(queue);
        let mut waits = 0;
        run_with(&handle, |delay| {
            assert!(delay <= DEFAULT_POLL_INTERVAL);
            waits += 1;
            Ok(waits < 3)
        })
        .unwrap();

        assert_eq!(waits, 3);
        assert!(!handle.is_running());
        assert!(!fired.get());
    }

    #[test]
    fn test_tick_after_stop_is_noop() {
        let queue = TimerQueue::new();
        queue.schedule(Duration::ZERO, Box::new(|| {}));

        let handle = mount(queue);
        handle.stop();
        assert_eq!(tick(&handle), 0);
        assert_eq!(handle.queue().pending(), 1);
    }

    #[test]
    fn test_mount_keeps_virtual_time() {
        let queue = TimerQueue::new();
        queue.advance(Duration::from_millis(500));

        let handle = mount(queue);
        assert!(handle.elapsed() >= Duration::from_millis(500));
        assert_eq!(handle.next_wait(), None);
    }

    #[test]
    fn test_running_flag_shared() {
        let handle = mount(TimerQueue::new());
        let flag = handle.running_flag();
        flag.store(false, Ordering::SeqCst);
        assert!(!handle.is_running());
    }
}
