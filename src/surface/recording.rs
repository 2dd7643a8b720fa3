//! Recording surface - keeps every write in order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::Surface;
use crate::types::SurfaceId;

/// Surface that records each text it is given. Clones share the record.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    id: SurfaceId,
    writes: Rc<RefCell<Vec<String>>>,
    attached: Rc<Cell<bool>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            id: SurfaceId::next(),
            writes: Rc::new(RefCell::new(Vec::new())),
            attached: Rc::new(Cell::new(true)),
        }
    }

    /// A surface that was never attached.
    pub fn detached() -> Self {
        let surface = Self::new();
        surface.detach();
        surface
    }

    /// Every write so far.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    /// What the surface currently shows.
    pub fn current(&self) -> Option<String> {
        self.writes.borrow().last().cloned()
    }

    pub fn detach(&self) {
        self.attached.set(false);
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn replace_text(&self, text: &str) {
        self.writes.borrow_mut().push(text.to_string());
    }
}
