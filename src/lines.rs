//! Line set - the fixed, ordered content an animator cycles through.
//!
//! A "character" here is an extended grapheme cluster, so a revealed
//! prefix never splits an emoji or a base letter from its combining mark.
//! Grapheme boundaries are computed once at construction; prefixes are
//! then plain byte slices.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::AnimatorError;

/// One line plus the byte offset at which each of its characters ends.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    /// `ends[i]` is the byte length of the first `i + 1` characters.
    ends: Vec<usize>,
}

impl Line {
    fn new(text: String) -> Self {
        let ends = text
            .grapheme_indices(true)
            .map(|(start, g)| start + g.len())
            .collect();
        Self { text, ends }
    }

    fn char_count(&self) -> usize {
        self.ends.len()
    }

    fn prefix(&self, len: usize) -> &str {
        match len.min(self.ends.len()) {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }
}

/// Non-empty ordered sequence of lines. Order defines the cycle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSet {
    lines: Vec<Line>,
}

impl LineSet {
    /// Build a line set. Fails if `lines` is empty.
    pub fn new<I, S>(lines: I) -> Result<Self, AnimatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<Line> = lines.into_iter().map(|s| Line::new(s.into())).collect();
        if lines.is_empty() {
            return Err(AnimatorError::EmptyLines);
        }
        Ok(Self { lines })
    }

    /// Number of lines (always at least one).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full text of line `index`.
    pub fn line(&self, index: usize) -> &str {
        &self.lines[index].text
    }

    /// Character count of line `index`.
    pub fn char_count(&self, index: usize) -> usize {
        self.lines[index].char_count()
    }

    /// First `len` characters of line `index`, clamped to the line length.
    pub fn prefix(&self, index: usize, len: usize) -> &str {
        self.lines[index].prefix(len)
    }

    /// Sum of all line character counts.
    pub fn total_chars(&self) -> usize {
        self.lines.iter().map(Line::char_count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================
