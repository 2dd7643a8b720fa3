//! Typing Demo - rotating headline in the terminal
//!
//! Types, holds and erases each line under a static title until a key is
//! pressed.
//!
//! Run with: cargo run --example typing [path/to/typewriter.toml]
//! Logs go to stderr: RUST_LOG=typewriter=debug cargo run --example typing 2>typing.log

use std::error::Error;
use std::io::{self, stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing_subscriber::EnvFilter;

use spark_typewriter::{
    mount, run_with, spawn_typing, AnimatorConfig, Attr, TerminalSurface, TimerQueue,
    TypewriterFile,
};

const DEFAULT_LINES: [&str; 3] = [
    "before failure.",
    "Cut unplanned downtime by 40%+.",
    "Turn sensor noise into actionable signals.",
];

fn load() -> Result<TypewriterFile, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(TypewriterFile::load(path)?),
        None => Ok(TypewriterFile {
            lines: DEFAULT_LINES.iter().map(|s| s.to_string()).collect(),
            timing: AnimatorConfig::default(),
        }),
    }
}

/// Raw mode and the alternate screen, undone on drop even when setup fails
/// halfway.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Restore the terminal (best effort)
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let file = load()?;

    let _terminal = TerminalGuard::enter()?;
    let mut out = stdout();
    queue!(
        out,
        MoveTo(2, 1),
        Print("Predict machine failures"),
        MoveTo(2, 4),
        Print("(press any key to quit)")
    )?;
    out.flush()?;

    let queue = TimerQueue::new();
    let surface = TerminalSurface::new(stdout(), 2, 2).with_attrs(Attr::BOLD);
    let animator = spawn_typing(Some(surface), file.lines, file.timing, queue.clone());

    let handle = mount(queue);
    let result = run_with(&handle, |wait| {
        if event::poll(wait)? {
            if let Event::Key(_) = event::read()? {
                return Ok(false);
            }
        }
        Ok(true)
    });

    if let Some(animator) = animator {
        animator.stop();
    }
    result?;
    Ok(())
}
