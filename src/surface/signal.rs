//! Signal surface - typed text held in a reactive signal.
//!
//! Any view that reads [`SignalSurface::content`] inside an effect or a
//! derived re-renders on every animator step.
//!
//! ```ignore
//! use spark_signals::effect;
//!
//! let surface = SignalSurface::new();
//! let content = surface.content();
//! let _stop = effect(move || draw_headline(&content.get()));
//!
//! spawn_typing(Some(surface), ["Hello", "World"], config, queue.clone());
//! ```

use spark_signals::{signal, Signal};

use super::Surface;
use crate::types::SurfaceId;

/// Surface backed by a `Signal<String>`.
///
/// Clones share the same signals and id.
#[derive(Clone)]
pub struct SignalSurface {
    id: SurfaceId,
    content: Signal<String>,
    attached: Signal<bool>,
}

impl SignalSurface {
    /// New attached surface with empty content.
    pub fn new() -> Self {
        Self::with_content(String::new())
    }

    /// New attached surface showing `initial` until the first step.
    pub fn with_content(initial: impl Into<String>) -> Self {
        Self {
            id: SurfaceId::next(),
            content: signal(initial.into()),
            attached: signal(true),
        }
    }

    /// The content signal, for binding to a view.
    pub fn content(&self) -> Signal<String> {
        self.content.clone()
    }

    /// The attachment signal.
    pub fn attached(&self) -> Signal<bool> {
        self.attached.clone()
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.content.get()
    }

    /// Remove the surface from its host. Running animators halt on their
    /// next step.
    pub fn detach(&self) {
        self.attached.set(false);
    }
}

impl Default for SignalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSurface")
            .field("id", &self.id)
            .field("content", &self.content.get())
            .field("attached", &self.attached.get())
            .finish()
    }
}

impl Surface for SignalSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn replace_text(&self, text: &str) {
        self.content.set(text.to_string());
    }
}

// =============================================================================
// TESTS
// =============================================================================
