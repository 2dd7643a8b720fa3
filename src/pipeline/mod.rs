//! Pipeline
//!
//! Connects the virtual-time engine to real time.
//!
//! ```text
//! wall clock → mount::tick → TimerQueue::advance_to → animator steps → surface writes
//! ```
//!
//! Everything runs on the calling thread; `run_with` lets the caller block
//! on terminal input instead of sleeping between ticks.

pub mod mount;

// Re-exports
pub use mount::{mount, run, run_with, tick, MountHandle, DEFAULT_POLL_INTERVAL};
