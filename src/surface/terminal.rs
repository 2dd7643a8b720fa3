//! Terminal surface - draws the typed text at a fixed cell.
//!
//! Each write moves to the anchor cell, clears to the end of the line and
//! prints the text with the configured attributes. The writer is usually
//! stdout, but anything implementing `io::Write` works.
//!
//! A failed write means the terminal is gone (closed pipe, hung-up tty),
//! so the surface detaches itself and the animator stops on its next step.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{queue, QueueableCommand};

use super::Surface;
use crate::types::{Attr, SurfaceId};

/// Surface anchored at `(col, row)` on a terminal.
///
/// Clones share the writer, the id and the attached flag.
pub struct TerminalSurface<W: Write> {
    id: SurfaceId,
    writer: Rc<RefCell<W>>,
    col: u16,
    row: u16,
    attrs: Attr,
    attached: Rc<Cell<bool>>,
}

impl<W: Write> Clone for TerminalSurface<W> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            writer: self.writer.clone(),
            col: self.col,
            row: self.row,
            attrs: self.attrs,
            attached: self.attached.clone(),
        }
    }
}

impl<W: Write> std::fmt::Debug for TerminalSurface<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface")
            .field("id", &self.id)
            .field("col", &self.col)
            .field("row", &self.row)
            .field("attrs", &self.attrs)
            .field("attached", &self.attached.get())
            .finish()
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(writer: W, col: u16, row: u16) -> Self {
        Self {
            id: SurfaceId::next(),
            writer: Rc::new(RefCell::new(writer)),
            col,
            row,
            attrs: Attr::NONE,
            attached: Rc::new(Cell::new(true)),
        }
    }

    /// Text attributes applied to every write.
    pub fn with_attrs(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn position(&self) -> (u16, u16) {
        (self.col, self.row)
    }

    pub fn detach(&self) {
        self.attached.set(false);
    }

    /// Run `f` with the underlying writer (e.g. to inspect a test buffer).
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.borrow_mut())
    }

    fn draw(&self, text: &str) -> io::Result<()> {
        let mut out = self.writer.borrow_mut();
        queue!(out, MoveTo(self.col, self.row), Clear(ClearType::UntilNewLine))?;
        for attribute in attributes(self.attrs) {
            out.queue(SetAttribute(attribute))?;
        }
        queue!(out, Print(text), SetAttribute(Attribute::Reset))?;
        out.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn replace_text(&self, text: &str) {
        if let Err(err) = self.draw(text) {
            tracing::warn!(target: "typewriter::terminal", surface = %self.id, %err, "write failed, detaching");
            self.detach();
        }
    }
}

/// Map our attribute flags to crossterm attributes.
fn attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::INVERSE, Attribute::Reverse),
    ]
    .into_iter()
    .filter(move |(flag, _)| attrs.contains(*flag))
    .map(|(_, attribute)| attribute)
}

// =============================================================================
// TESTS
// =============================================================================
