//! Core types for spark-typewriter.
//!
//! Small value types shared by the engine and the surfaces:
//! - [`Phase`] - one step of the typing/holding/erasing/pausing cycle
//! - [`AnimatorState`] - the mutable cursor into a [`LineSet`](crate::LineSet)
//! - [`Status`] - lifecycle of an animator instance
//! - [`SurfaceId`] - identity of a display surface
//! - [`Attr`] - text attributes applied by terminal surfaces

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Phase
// =============================================================================

/// One state of the typing cycle.
///
/// Every phase has exactly one successor:
/// `Typing → Holding → Erasing → InterLinePause → Typing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Revealing the current line one character per step.
    #[default]
    Typing,
    /// Full line shown, waiting before erasing.
    Holding,
    /// Removing the current line one character per step.
    Erasing,
    /// Empty surface, waiting before the next line.
    InterLinePause,
}

impl Phase {
    /// Whether steps in this phase write to the surface.
    pub fn writes(self) -> bool {
        matches!(self, Self::Typing | Self::Erasing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Typing => "typing",
            Self::Holding => "holding",
            Self::Erasing => "erasing",
            Self::InterLinePause => "pause",
        };
        f.write_str(name)
    }
}

// =============================================================================
// AnimatorState
// =============================================================================

/// Position of an animator inside its line set.
///
/// `line_index` always indexes a valid line and `length` never exceeds
/// that line's character count. Only the state machine mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimatorState {
    /// Index of the line being typed or erased.
    pub line_index: usize,
    /// Number of characters currently revealed.
    pub length: usize,
    /// Current phase.
    pub phase: Phase,
}

impl AnimatorState {
    /// The state every animator starts from: first line, nothing shown, typing.
    pub const INITIAL: Self = Self {
        line_index: 0,
        length: 0,
        phase: Phase::Typing,
    };
}

// =============================================================================
// Status
// =============================================================================

/// Lifecycle of an animator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Constructed, nothing scheduled yet.
    #[default]
    Idle,
    /// A step is scheduled.
    Running,
    /// Stopped explicitly.
    Stopped,
    /// Halted because the surface went away.
    Halted,
}

impl Status {
    /// True once the animator will never schedule another step on its own.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Stopped | Self::Halted)
    }
}

// =============================================================================
// SurfaceId
// =============================================================================

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a display surface.
///
/// Two handles to the same surface must report the same id; the binding
/// registry uses it to refuse a second animator on one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an externally assigned id (e.g. a host node handle).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

// =============================================================================
// Text Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AnimatorState::default();
        assert_eq!(state, AnimatorState::INITIAL);
        assert_eq!(state.phase, Phase::Typing);
    }

    #[test]
    fn test_phase_writes() {
        assert!(Phase::Typing.writes());
        assert!(Phase::Erasing.writes());
        assert!(!Phase::Holding.writes());
        assert!(!Phase::InterLinePause.writes());
    }

    #[test]
    fn test_surface_ids_unique() {
        let a = SurfaceId::next();
        let b = SurfaceId::next();
        assert_ne!(a, b);
        assert_eq!(SurfaceId::from_raw(a.raw()), a);
    }

    #[test]
    fn test_attr_combine() {
        let attrs = Attr::BOLD | Attr::UNDERLINE;
        assert!(attrs.contains(Attr::BOLD));
        assert!(!attrs.contains(Attr::ITALIC));
    }
}
