//! Typing engine - state machine, scheduling and bindings.
//!
//! - Machine: the pure Typing → Holding → Erasing → InterLinePause cycle
//! - Scheduler: cancellable delayed callbacks over a virtual clock
//! - Animator: one machine wired to one surface, one pending timer at a time
//! - Registry: at most one running animator per surface
//!
//! # Architecture
//!
//! ```text
//! TimerQueue ──fires──▶ animator step ──▶ TypingMachine::step ──▶ Surface::replace_text
//!      ▲                     │
//!      └──── schedule(delay) ┘
//! ```

mod animator;
mod machine;
mod scheduler;
pub mod registry;

pub use animator::{AnimatorHandle, TypingAnimator};
pub use machine::{Step, TypingMachine};
pub use registry::{bind, reset_bindings, spawn_typing, Binding};
pub use scheduler::{Callback, Scheduler, TimerHandle, TimerQueue};
