//! Surfaces - where the typed text is shown.
//!
//! A surface is anything that can replace its displayed text. It also
//! reports whether it is still attached to its host; an animator checks
//! that before every write and halts quietly once it is gone.
//!
//! - [`SignalSurface`] - text in a reactive signal, for signal-driven views
//! - [`RecordingSurface`] - keeps every write, for tests and headless runs
//! - [`TerminalSurface`] - draws at a fixed terminal position via crossterm

mod recording;
mod signal;
mod terminal;

pub use recording::RecordingSurface;
pub use signal::SignalSurface;
pub use terminal::TerminalSurface;

use std::rc::Rc;

use crate::types::SurfaceId;

/// A text sink owned by one animator while it runs.
pub trait Surface {
    /// Stable identity; clones of one surface share it.
    fn id(&self) -> SurfaceId;

    /// False once the surface has been removed from its host.
    fn is_attached(&self) -> bool;

    /// Replace the displayed text with `text`.
    fn replace_text(&self, text: &str);
}

impl<S: Surface + ?Sized> Surface for Rc<S> {
    fn id(&self) -> SurfaceId {
        (**self).id()
    }

    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }

    fn replace_text(&self, text: &str) {
        (**self).replace_text(text);
    }
}
