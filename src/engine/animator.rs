//! Typing animator - the state machine wired to a surface and a scheduler.
//!
//! Each step runs on a scheduled callback and schedules its successor, so
//! one animator has at most one pending timer and its steps never overlap.
//! A `Status` field doubles as the stop flag and is checked at the top of
//! every step.
//!
//! # Example
//!
//! ```ignore
//! let queue = TimerQueue::new();
//! let surface = RecordingSurface::new();
//! let lines = LineSet::new(["hi", "bye"])?;
//!
//! let animator = TypingAnimator::new(surface.clone(), lines, AnimatorConfig::default(), queue.clone())?;
//! animator.start();
//!
//! queue.advance(Duration::from_secs(1));
//! animator.stop();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::machine::{Step, TypingMachine};
use super::scheduler::{Scheduler, TimerHandle};
use crate::config::AnimatorConfig;
use crate::error::AnimatorError;
use crate::lines::LineSet;
use crate::surface::Surface;
use crate::types::{AnimatorState, Status, SurfaceId};

static NEXT_ANIMATOR_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Inner state
// =============================================================================

struct Inner<S: Surface> {
    id: u64,
    surface: S,
    machine: RefCell<TypingMachine>,
    scheduler: Rc<dyn Scheduler>,
    status: Cell<Status>,
    pending: RefCell<Option<TimerHandle>>,
    steps: Cell<u64>,
}

impl<S: Surface> Inner<S> {
    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn halt(&self) {
        self.cancel_pending();
        self.status.set(Status::Halted);
        super::registry::unclaim(self.surface.id(), self.id);
        tracing::debug!(
            target: "typewriter::animator",
            animator = self.id,
            surface = %self.surface.id(),
            steps = self.steps.get(),
            "surface detached, halting"
        );
    }
}

fn schedule_step<S: Surface + 'static>(inner: &Rc<Inner<S>>, delay: Duration) {
    let next = inner.clone();
    let handle = inner
        .scheduler
        .schedule(delay, Box::new(move || run_step(&next)));
    *inner.pending.borrow_mut() = Some(handle);
}

fn run_step<S: Surface + 'static>(inner: &Rc<Inner<S>>) {
    inner.pending.borrow_mut().take();

    if inner.status.get() != Status::Running {
        return;
    }
    if !inner.surface.is_attached() {
        inner.halt();
        return;
    }

    let Step { performed, text, delay } = inner.machine.borrow_mut().step();
    inner.steps.set(inner.steps.get() + 1);

    tracing::trace!(
        target: "typewriter::animator",
        animator = inner.id,
        line = performed.line_index,
        length = performed.length,
        phase = %performed.phase,
        "step"
    );

    if let Some(text) = text {
        inner.surface.replace_text(&text);
    }

    // An observer of the write may have stopped or restarted us. A restart
    // already scheduled its own first step.
    if inner.status.get() == Status::Running && inner.pending.borrow().is_none() {
        schedule_step(inner, delay);
    }
}

// =============================================================================
// TypingAnimator
// =============================================================================

/// Drives a [`Surface`] through the typing cycle of a [`LineSet`].
///
/// Cheap to clone; clones control the same instance. The pending timer
/// keeps the instance alive, so dropping every handle does not stop it.
pub struct TypingAnimator<S: Surface + 'static> {
    inner: Rc<Inner<S>>,
}

impl<S: Surface + 'static> Clone for TypingAnimator<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<S: Surface + 'static> fmt::Debug for TypingAnimator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypingAnimator")
            .field("id", &self.inner.id)
            .field("surface", &self.inner.surface.id())
            .field("status", &self.inner.status.get())
            .field("state", &self.state())
            .finish()
    }
}

impl<S: Surface + 'static> TypingAnimator<S> {
    /// Bind an animator to `surface`. Nothing is scheduled until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`AnimatorError::SurfaceDetached`] if the surface is not attached
    /// - [`AnimatorError::InvalidConfig`] if an interval is zero
    pub fn new(
        surface: S,
        lines: LineSet,
        config: AnimatorConfig,
        scheduler: impl Scheduler + 'static,
    ) -> Result<Self, AnimatorError> {
        Self::with_scheduler(surface, lines, config, Rc::new(scheduler))
    }

    /// Like [`new`](Self::new) with an already shared scheduler.
    pub fn with_scheduler(
        surface: S,
        lines: LineSet,
        config: AnimatorConfig,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, AnimatorError> {
        config.validate()?;
        if !surface.is_attached() {
            return Err(AnimatorError::SurfaceDetached(surface.id()));
        }

        Ok(Self {
            inner: Rc::new(Inner {
                id: NEXT_ANIMATOR_ID.fetch_add(1, Ordering::Relaxed),
                surface,
                machine: RefCell::new(TypingMachine::new(lines, config)),
                scheduler,
                status: Cell::new(Status::Idle),
                pending: RefCell::new(None),
                steps: Cell::new(0),
            }),
        })
    }

    /// Schedule the first step after the configured start delay.
    ///
    /// No-op while already running. Halts at once if the surface has gone.
    /// Returns false, scheduling nothing, if the surface is gone or another
    /// running animator is bound to it.
    pub fn start(&self) -> bool {
        let inner = &self.inner;
        if inner.status.get() == Status::Running {
            return true;
        }
        if !inner.surface.is_attached() {
            inner.halt();
            return false;
        }
        if !super::registry::claim(self.handle()) {
            tracing::debug!(
                target: "typewriter::animator",
                animator = inner.id,
                surface = %inner.surface.id(),
                "surface already bound, not starting"
            );
            return false;
        }

        inner.status.set(Status::Running);
        let delay = inner.machine.borrow().config().start_delay();
        tracing::debug!(
            target: "typewriter::animator",
            animator = inner.id,
            surface = %inner.surface.id(),
            lines = inner.machine.borrow().lines().len(),
            "start"
        );
        schedule_step(inner, delay);
        true
    }

    /// Stop for good: no further writes, no further timers.
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Reset to the first line and start again.
    ///
    /// Returns false, leaving the animator untouched, if another running
    /// animator has been bound to the same surface in the meantime.
    pub fn restart(&self) -> bool {
        let inner = &self.inner;
        if super::registry::is_bound_elsewhere(inner.surface.id(), inner.id) {
            return false;
        }
        inner.cancel_pending();
        inner.machine.borrow_mut().reset();
        inner.status.set(Status::Idle);
        self.start()
    }

    pub fn status(&self) -> Status {
        self.inner.status.get()
    }

    pub fn is_running(&self) -> bool {
        self.status() == Status::Running
    }

    /// Current position in the cycle.
    pub fn state(&self) -> AnimatorState {
        self.inner.machine.borrow().state()
    }

    /// Number of steps executed since construction.
    pub fn steps(&self) -> u64 {
        self.inner.steps.get()
    }

    pub fn surface(&self) -> &S {
        &self.inner.surface
    }

    /// Type-erased control handle.
    pub fn handle(&self) -> AnimatorHandle {
        AnimatorHandle {
            control: self.inner.clone(),
        }
    }
}

// =============================================================================
// AnimatorHandle
// =============================================================================

trait Control {
    fn id(&self) -> u64;
    fn surface_id(&self) -> SurfaceId;
    fn status(&self) -> Status;
    fn state(&self) -> AnimatorState;
    fn stop(&self);
}

impl<S: Surface> Control for Inner<S> {
    fn id(&self) -> u64 {
        self.id
    }

    fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    fn status(&self) -> Status {
        self.status.get()
    }

    fn state(&self) -> AnimatorState {
        self.machine.borrow().state()
    }

    fn stop(&self) {
        self.cancel_pending();
        if self.status.get().is_finished() {
            return;
        }
        self.status.set(Status::Stopped);
        super::registry::unclaim(self.surface.id(), self.id);
        tracing::debug!(
            target: "typewriter::animator",
            animator = self.id,
            surface = %self.surface.id(),
            steps = self.steps.get(),
            "stop"
        );
    }
}

/// Control handle for an animator of any surface type.
#[derive(Clone)]
pub struct AnimatorHandle {
    control: Rc<dyn Control>,
}

impl AnimatorHandle {
    /// Process-unique animator id.
    pub fn id(&self) -> u64 {
        self.control.id()
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.control.surface_id()
    }

    pub fn status(&self) -> Status {
        self.control.status()
    }

    pub fn state(&self) -> AnimatorState {
        self.control.state()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    /// True if both handles control the same animator.
    pub fn same_animator(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Debug for AnimatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatorHandle")
            .field("id", &self.id())
            .field("surface", &self.surface_id())
            .field("status", &self.status())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::TimerQueue;
    use crate::surface::RecordingSurface;
    use crate::types::Phase;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn config() -> AnimatorConfig {
        AnimatorConfig::default()
            .with_type_interval(10)
            .with_hold(100)
            .with_erase_interval(5)
            .with_inter_line_pause(20)
            .with_start_delay(0)
    }

    fn setup(lines: &[&str]) -> (TimerQueue, RecordingSurface, TypingAnimator<RecordingSurface>) {
        let queue = TimerQueue::new();
        let surface = RecordingSurface::new();
        let animator = TypingAnimator::new(
            surface.clone(),
            LineSet::new(lines.iter().copied()).unwrap(),
            config(),
            queue.clone(),
        )
        .unwrap();
        (queue, surface, animator)
    }

    #[test]
    fn test_nothing_scheduled_before_start() {
        let (queue, surface, animator) = setup(&["hi"]);
        assert_eq!(animator.status(), Status::Idle);
        assert_eq!(queue.pending(), 0);
        queue.advance(ms(1000));
        assert_eq!(surface.write_count(), 0);
    }

    #[test]
    fn test_single_timer_while_running() {
        let (queue, _surface, animator) = setup(&["hello"]);
        animator.start();
        animator.start();
        assert_eq!(queue.pending(), 1);

        for _ in 0..50 {
            queue.run_next();
            assert_eq!(queue.pending(), 1);
        }
    }

    #[test]
    fn test_typing_timeline() {
        let (queue, surface, animator) = setup(&["hi", "bye"]);
        animator.start();

        queue.advance(Duration::ZERO);
        assert_eq!(surface.writes(), vec![""]);

        queue.advance(ms(20));
        assert_eq!(surface.writes(), vec!["", "h", "hi"]);
        assert_eq!(animator.state().phase, Phase::Holding);

        // Hold step fires at 30, first erase at 130
        queue.advance(ms(109));
        assert_eq!(surface.current().as_deref(), Some("hi"));
        assert_eq!(surface.write_count(), 3);

        queue.advance(ms(1));
        assert_eq!(surface.write_count(), 4);
    }

    #[test]
    fn test_start_delay() {
        let queue = TimerQueue::new();
        let surface = RecordingSurface::new();
        let animator = TypingAnimator::new(
            surface.clone(),
            LineSet::new(["a"]).unwrap(),
            config().with_start_delay(300),
            queue.clone(),
        )
        .unwrap();
        animator.start();

        queue.advance(ms(299));
        assert_eq!(surface.write_count(), 0);
        queue.advance(ms(1));
        assert_eq!(surface.writes(), vec![""]);
    }

    #[test]
    fn test_stop_is_effective() {
        let (queue, surface, animator) = setup(&["hello"]);
        animator.start();
        queue.advance(ms(25));
        let written = surface.write_count();

        animator.stop();
        assert_eq!(animator.status(), Status::Stopped);
        assert_eq!(queue.pending(), 0);

        queue.advance(ms(10_000));
        assert_eq!(surface.write_count(), written);
    }

    #[test]
    fn test_detach_halts_silently() {
        let (queue, surface, animator) = setup(&["hello"]);
        animator.start();
        queue.advance(ms(15));
        let written = surface.write_count();

        surface.detach();
        queue.advance(ms(10_000));

        assert_eq!(surface.write_count(), written);
        assert_eq!(animator.status(), Status::Halted);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_detached_surface_rejected() {
        let err = TypingAnimator::new(
            RecordingSurface::detached(),
            LineSet::new(["x"]).unwrap(),
            config(),
            TimerQueue::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AnimatorError::SurfaceDetached(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let queue = TimerQueue::new();
        let err = TypingAnimator::new(
            RecordingSurface::new(),
            LineSet::new(["x"]).unwrap(),
            config().with_type_interval(0),
            queue.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, AnimatorError::InvalidConfig(_)));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_second_animator_on_same_surface_refused() {
        let (queue, surface, first) = setup(&["one"]);
        let second = TypingAnimator::new(
            surface.clone(),
            LineSet::new(["two"]).unwrap(),
            config(),
            queue.clone(),
        )
        .unwrap();

        assert!(first.start());
        assert!(!second.start());
        assert_eq!(second.status(), Status::Idle);
        assert_eq!(queue.pending(), 1);

        // Once the first one stops the surface is free again
        first.stop();
        assert!(second.start());
        assert!(!first.restart());
    }

    #[test]
    fn test_restart_resets_cycle() {
        let (queue, surface, animator) = setup(&["hi", "bye"]);
        animator.start();
        queue.advance(ms(200));
        assert_eq!(animator.state().line_index, 1);

        surface.clear();
        assert!(animator.restart());
        assert_eq!(queue.pending(), 1);
        assert_eq!(animator.state(), AnimatorState::INITIAL);

        queue.advance(ms(20));
        assert_eq!(surface.writes(), vec!["", "h", "hi"]);
    }

    #[test]
    fn test_restart_after_stop() {
        let (queue, surface, animator) = setup(&["ok"]);
        animator.start();
        animator.stop();
        assert!(animator.restart());
        assert!(animator.is_running());
        queue.advance(Duration::ZERO);
        assert_eq!(surface.writes(), vec![""]);
    }

    #[test]
    fn test_handle_controls_animator() {
        let (queue, surface, animator) = setup(&["abc"]);
        let handle = animator.handle();
        animator.start();
        assert_eq!(handle.status(), Status::Running);
        assert_eq!(handle.surface_id(), surface.id());

        handle.stop();
        queue.advance(ms(1000));
        assert_eq!(animator.status(), Status::Stopped);
        assert_eq!(surface.write_count(), 0);
    }

    /// Recording surface that runs a callback after every write.
    #[derive(Clone)]
    struct HookSurface {
        recording: RecordingSurface,
        hook: Rc<RefCell<Option<Box<dyn FnMut(&str)>>>>,
    }

    impl HookSurface {
        fn new() -> Self {
            Self {
                recording: RecordingSurface::new(),
                hook: Rc::new(RefCell::new(None)),
            }
        }

        fn on_write(&self, hook: impl FnMut(&str) + 'static) {
            *self.hook.borrow_mut() = Some(Box::new(hook));
        }
    }

    impl Surface for HookSurface {
        fn id(&self) -> SurfaceId {
            self.recording.id()
        }

        fn is_attached(&self) -> bool {
            self.recording.is_attached()
        }

        fn replace_text(&self, text: &str) {
            self.recording.replace_text(text);
            let hook = self.hook.borrow_mut().take();
            if let Some(mut hook) = hook {
                hook(text);
                *self.hook.borrow_mut() = Some(hook);
            }
        }
    }

    fn hooked(lines: &[&str]) -> (TimerQueue, HookSurface, TypingAnimator<HookSurface>) {
        let queue = TimerQueue::new();
        let surface = HookSurface::new();
        let animator = TypingAnimator::new(
            surface.clone(),
            LineSet::new(lines.iter().copied()).unwrap(),
            config(),
            queue.clone(),
        )
        .unwrap();
        (queue, surface, animator)
    }

    #[test]
    fn test_restart_from_write_keeps_single_timer() {
        let (queue, surface, animator) = hooked(&["hi", "bye"]);
        let target = animator.clone();
        let mut fired = false;
        surface.on_write(move |text| {
            if text == "hi" && !fired {
                fired = true;
                assert!(target.restart());
            }
        });
        animator.start();

        queue.advance(ms(20));
        assert_eq!(queue.pending(), 1);

        queue.advance(ms(20));
        assert_eq!(surface.recording.writes(), vec!["", "h", "hi", "", "h", "hi"]);
        assert_eq!(queue.pending(), 1);
        assert_eq!(animator.state().phase, Phase::Holding);
    }

    #[test]
    fn test_stop_then_start_from_write_keeps_single_timer() {
        let (queue, surface, animator) = hooked(&["abc"]);
        let target = animator.clone();
        let mut fired = false;
        surface.on_write(move |text| {
            if text == "a" && !fired {
                fired = true;
                target.stop();
                assert!(target.start());
            }
        });
        animator.start();

        for _ in 0..30 {
            queue.run_next();
            assert_eq!(queue.pending(), 1);
        }
        assert!(animator.is_running());
    }

    #[test]
    fn test_stop_from_write_schedules_nothing() {
        let (queue, surface, animator) = hooked(&["abc"]);
        let target = animator.clone();
        surface.on_write(move |text| {
            if text == "ab" {
                target.stop();
            }
        });
        animator.start();

        queue.advance(ms(1000));
        assert_eq!(surface.recording.writes(), vec!["", "a", "ab"]);
        assert_eq!(queue.pending(), 0);
        assert_eq!(animator.status(), Status::Stopped);
    }

    #[test]
    fn test_keeps_running_without_handles() {
        let (queue, surface, animator) = setup(&["ab"]);
        animator.start();
        drop(animator);

        queue.advance(ms(1000));
        assert!(surface.write_count() > 3);
    }
}
