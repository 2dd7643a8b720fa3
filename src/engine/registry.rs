//! Binding registry - at most one running animator per surface.
//!
//! Two timer chains writing to one surface interleave their text, so
//! every [`TypingAnimator::start`] claims its surface here first. A claim
//! is refused while another animator on the same surface is running.
//! Animators drop their claim when they stop or halt, so the registry only
//! ever holds running animators.
//!
//! The registry is per thread, like the animators themselves.
//!
//! # Example
//!
//! ```ignore
//! use spark_typewriter::engine::registry::{bind, Binding};
//!
//! match bind(surface.clone(), lines.clone(), config, queue.clone())? {
//!     Binding::Started(animator) => { /* new instance */ }
//!     Binding::AlreadyBound(handle) => { /* existing instance, nothing created */ }
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use super::animator::{AnimatorHandle, TypingAnimator};
use super::scheduler::Scheduler;
use crate::config::AnimatorConfig;
use crate::error::AnimatorError;
use crate::lines::LineSet;
use crate::surface::Surface;
use crate::types::{Status, SurfaceId};

// =============================================================================
// BINDING REGISTRY
// =============================================================================

thread_local! {
    /// Map from surface to the animator that last claimed it
    static BINDINGS: RefCell<HashMap<SurfaceId, AnimatorHandle>> = RefCell::new(HashMap::new());
}

fn is_live(handle: &AnimatorHandle) -> bool {
    handle.status() == Status::Running
}

/// Claim the handle's surface for its animator.
///
/// Succeeds if the surface is free, held by a finished animator, or
/// already held by this same animator.
pub(crate) fn claim(handle: AnimatorHandle) -> bool {
    BINDINGS.with(|bindings| {
        let mut bindings = bindings.borrow_mut();
        let surface = handle.surface_id();
        match bindings.get(&surface) {
            Some(existing) if is_live(existing) && !existing.same_animator(&handle) => false,
            _ => {
                bindings.insert(surface, handle);
                true
            }
        }
    })
}

/// Drop the claim on `surface` if `animator_id` holds it.
pub(crate) fn unclaim(surface: SurfaceId, animator_id: u64) {
    let removed = BINDINGS.with(|bindings| {
        let mut bindings = bindings.borrow_mut();
        match bindings.get(&surface) {
            Some(existing) if existing.id() == animator_id => bindings.remove(&surface),
            _ => None,
        }
    });
    // Dropped outside the borrow
    drop(removed);
}

/// True if a running animator other than `animator_id` holds `surface`.
pub(crate) fn is_bound_elsewhere(surface: SurfaceId, animator_id: u64) -> bool {
    binding_for(surface).is_some_and(|h| h.id() != animator_id)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Outcome of [`bind`].
#[derive(Debug)]
pub enum Binding<S: Surface + 'static> {
    /// A new animator was created and started.
    Started(TypingAnimator<S>),
    /// The surface already had a running animator; nothing was created.
    AlreadyBound(AnimatorHandle),
}

impl<S: Surface + 'static> Binding<S> {
    /// Handle to whichever animator now drives the surface.
    pub fn handle(&self) -> AnimatorHandle {
        match self {
            Self::Started(animator) => animator.handle(),
            Self::AlreadyBound(handle) => handle.clone(),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Create and start an animator on `surface`, unless one is already
/// running there.
///
/// # Errors
///
/// Construction errors from [`TypingAnimator::new`]. An already bound
/// surface is not an error.
pub fn bind<S: Surface + 'static>(
    surface: S,
    lines: LineSet,
    config: AnimatorConfig,
    scheduler: impl Scheduler + 'static,
) -> Result<Binding<S>, AnimatorError> {
    if let Some(existing) = binding_for(surface.id()) {
        tracing::debug!(
            target: "typewriter::registry",
            surface = %surface.id(),
            animator = existing.id(),
            "already bound"
        );
        return Ok(Binding::AlreadyBound(existing));
    }

    let animator = TypingAnimator::new(surface, lines, config, scheduler)?;
    if !animator.start() {
        // Detached between construction and start.
        return Err(AnimatorError::SurfaceDetached(animator.surface().id()));
    }
    Ok(Binding::Started(animator))
}

/// Start typing on `surface` if it exists, swallowing every failure.
///
/// For page-style setup code where a missing headline element simply
/// means no animation. Failures are logged at debug level.
pub fn spawn_typing<S, I, T>(
    surface: Option<S>,
    lines: I,
    config: AnimatorConfig,
    scheduler: impl Scheduler + 'static,
) -> Option<AnimatorHandle>
where
    S: Surface + 'static,
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let Some(surface) = surface else {
        tracing::debug!(target: "typewriter::registry", "no surface, typing disabled");
        return None;
    };

    let result = LineSet::new(lines).and_then(|lines| bind(surface, lines, config, scheduler));
    match result {
        Ok(binding) => Some(binding.handle()),
        Err(err) => {
            tracing::debug!(target: "typewriter::registry", %err, "typing disabled");
            None
        }
    }
}

/// The running animator bound to `surface`, if any.
pub fn binding_for(surface: SurfaceId) -> Option<AnimatorHandle> {
    BINDINGS.with(|bindings| bindings.borrow().get(&surface).filter(|h| is_live(h)).cloned())
}

pub fn is_bound(surface: SurfaceId) -> bool {
    binding_for(surface).is_some()
}

/// Stop the animator on `surface` and free the surface.
pub fn release(surface: SurfaceId) -> Option<AnimatorHandle> {
    let handle = BINDINGS.with(|bindings| bindings.borrow_mut().remove(&surface))?;
    handle.stop();
    Some(handle)
}

/// Number of surfaces with a running animator.
pub fn bound_count() -> usize {
    BINDINGS.with(|bindings| bindings.borrow().values().filter(|h| is_live(h)).count())
}

/// Stop every bound animator and clear the registry (for testing).
pub fn reset_bindings() {
    let handles: Vec<AnimatorHandle> =
        BINDINGS.with(|bindings| bindings.borrow_mut().drain().map(|(_, h)| h).collect());
    for handle in handles {
        handle.stop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
