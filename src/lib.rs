//! # spark-typewriter
//!
//! Typing-text animation for terminal and reactive UIs.
//!
//! An animator cycles through an ordered set of lines: it types each one
//! character by character, holds it, erases it, pauses, then moves on to
//! the next, forever, until stopped or until its surface goes away.
//!
//! ## Architecture
//!
//! Everything is single-threaded and timer-driven. Each step schedules
//! the next one on a [`Scheduler`], so one animator never has two steps in
//! flight:
//! ```text
//! TimerQueue → TypingAnimator → TypingMachine → Surface
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Phase, AnimatorState, SurfaceId, Attr)
//! - [`config`] - Timing configuration and TOML loading
//! - [`lines`] - The ordered, grapheme-aware line set
//! - [`engine`] - State machine, scheduler, animator, binding registry
//! - [`surface`] - Signal, recording and terminal surfaces
//! - [`pipeline`] - Wall-clock driver for the timer queue

pub mod config;
pub mod engine;
pub mod error;
pub mod lines;
pub mod pipeline;
pub mod surface;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{AnimatorConfig, TypewriterFile};
pub use error::{AnimatorError, ConfigError};
pub use lines::LineSet;

pub use engine::{
    bind, reset_bindings, spawn_typing, AnimatorHandle, Binding, Scheduler, Step, TimerHandle,
    TimerQueue, TypingAnimator, TypingMachine,
};

pub use surface::{RecordingSurface, SignalSurface, Surface, TerminalSurface};

pub use pipeline::{mount, run, run_with, tick, MountHandle};
