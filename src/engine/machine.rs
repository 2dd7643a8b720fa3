//! Typing state machine.
//!
//! Pure and clock-free: [`TypingMachine::step`] runs the entry action of
//! the current phase, moves to the successor state and says how long to
//! wait before the next step. The animator owns scheduling and the
//! surface; this type owns only the cycle.
//!
//! ```text
//! Typing ──(length == len)──▶ Holding ──▶ Erasing ──(length == 0)──▶ InterLinePause
//!   ▲  └─(length += 1)─┘                    └─(length -= 1)─┘              │
//!   └──────────────────────── next line, length = 0 ◀──────────────────────┘
//! ```

use std::time::Duration;

use crate::config::AnimatorConfig;
use crate::lines::LineSet;
use crate::types::{AnimatorState, Phase};

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// State whose entry action just ran.
    pub performed: AnimatorState,
    /// Text to put on the surface, for Typing and Erasing steps.
    pub text: Option<String>,
    /// Wait before the next step.
    pub delay: Duration,
}

/// The typing/holding/erasing/pausing cycle over a [`LineSet`].
#[derive(Debug, Clone)]
pub struct TypingMachine {
    lines: LineSet,
    config: AnimatorConfig,
    state: AnimatorState,
}

impl TypingMachine {
    pub fn new(lines: LineSet, config: AnimatorConfig) -> Self {
        Self {
            lines,
            config,
            state: AnimatorState::INITIAL,
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Back to the first line, nothing revealed, typing.
    pub fn reset(&mut self) {
        self.state = AnimatorState::INITIAL;
    }

    /// Run the current phase and advance to its successor.
    pub fn step(&mut self) -> Step {
        let performed = self.state;
        let line_len = self.lines.char_count(performed.line_index);

        let (next, delay) = match performed.phase {
            Phase::Typing if performed.length >= line_len => (
                AnimatorState { phase: Phase::Holding, ..performed },
                self.config.type_interval(),
            ),
            Phase::Typing => (
                AnimatorState { length: performed.length + 1, ..performed },
                self.config.type_interval(),
            ),
            Phase::Holding => (
                AnimatorState { phase: Phase::Erasing, ..performed },
                self.config.hold(),
            ),
            Phase::Erasing if performed.length == 0 => (
                AnimatorState { phase: Phase::InterLinePause, ..performed },
                self.config.erase_interval(),
            ),
            Phase::Erasing => (
                AnimatorState { length: performed.length - 1, ..performed },
                self.config.erase_interval(),
            ),
            Phase::InterLinePause => (
                AnimatorState {
                    line_index: (performed.line_index + 1) % self.lines.len(),
                    length: 0,
                    phase: Phase::Typing,
                },
                self.config.inter_line_pause(),
            ),
        };

        self.state = next;
        let text = performed
            .phase
            .writes()
            .then(|| self.lines.prefix(performed.line_index, performed.length).to_owned());

        Step { performed, text, delay }
    }

    /// Number of steps in one full pass over every line.
    ///
    /// Each line of `n` characters takes `n + 1` typing steps, one hold,
    /// `n + 1` erasing steps and one pause.
    pub fn steps_per_cycle(&self) -> usize {
        (0..self.lines.len())
            .map(|i| 2 * self.lines.char_count(i) + 4)
            .sum()
    }

    /// Simulated time of one full pass over every line.
    pub fn cycle_duration(&self) -> Duration {
        let c = &self.config;
        (0..self.lines.len())
            .map(|i| {
                let writes = self.lines.char_count(i) as u32 + 1;
                c.type_interval() * writes + c.hold() + c.erase_interval() * writes + c.inter_line_pause()
            })
            .sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
