//! Incremental per-line direction decorations for an editable buffer.
//!
//! The host editor owns the text; this module only asks it for lines
//! through [`LineSource`] and keeps one [`DecorationEntry`] per line it has
//! seen, ordered by line start. Edits shift the cached entries and only the
//! lines an edit touched are recomputed.

mod cache;

pub use cache::LineDecorations;

use serde::Serialize;
use thiserror::Error;

use crate::direction::Direction;

/// Failure of a host buffer query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("offset {offset} is outside the document (length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

/// Half-open `start..end` offsets of one line, newline excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` lies on this line (the line end included).
    pub const fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Translate both ends by `amount`, clamping at zero.
    #[must_use]
    pub const fn shifted(self, amount: isize) -> Self {
        Self {
            start: self.start.saturating_add_signed(amount),
            end: self.end.saturating_add_signed(amount),
        }
    }
}

/// The decoration of one cached line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecorationEntry {
    pub range: TextRange,
    /// `None` is the neutral decoration (no explicit direction).
    pub direction: Option<Direction>,
    /// The line had no strong character and took its direction from the
    /// nearest preceding line (or the default).
    #[serde(skip)]
    pub inherited: bool,
}

impl DecorationEntry {
    pub const fn new(range: TextRange, direction: Option<Direction>) -> Self {
        Self {
            range,
            direction,
            inherited: false,
        }
    }

    pub const fn inherited(range: TextRange, direction: Option<Direction>) -> Self {
        Self {
            range,
            direction,
            inherited: true,
        }
    }

    /// Value for the line's `dir` attribute; empty when neutral.
    pub const fn dir_attribute(&self) -> &'static str {
        match self.direction {
            Some(direction) => direction.as_str(),
            None => "",
        }
    }
}

/// A single contiguous net insertion (`amount > 0`) or deletion
/// (`amount < 0`) at `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDelta {
    pub anchor: usize,
    pub amount: isize,
}

/// One replaced span of an edit, as reported by the host.
///
/// `from_old..to_old` in the document before the change was replaced by
/// `from_new..to_new` in the document after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub from_old: usize,
    pub to_old: usize,
    pub from_new: usize,
    pub to_new: usize,
}

impl Change {
    pub const fn new(from_old: usize, to_old: usize, from_new: usize, to_new: usize) -> Self {
        Self {
            from_old,
            to_old,
            from_new,
            to_new,
        }
    }

    /// A pure insertion of `len` characters at `at`.
    pub const fn insert(at: usize, len: usize) -> Self {
        Self::new(at, at, at, at + len)
    }

    /// A pure deletion of `from..to`.
    pub const fn delete(from: usize, to: usize) -> Self {
        Self::new(from, to, from, from)
    }

    /// Net change in document length.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn amount(&self) -> isize {
        (self.to_new - self.from_new) as isize - (self.to_old - self.from_old) as isize
    }

    /// The shift this change implies for entries behind it.
    ///
    /// Deletions anchor at the collapsed end; insertions and net growth
    /// anchor at the end of the replaced text. Both are expressed in
    /// coordinates where earlier changes of the same update already apply.
    pub const fn delta(&self) -> EditDelta {
        let amount = self.amount();
        let anchor = if amount < 0 {
            self.to_new
        } else {
            self.from_new + (self.to_old - self.from_old)
        };
        EditDelta { anchor, amount }
    }
}

/// The visible part of the document, as offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub from: usize,
    pub to: usize,
}

impl Viewport {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// Everything the host reports in one update notification.
#[derive(Debug, Clone, Default)]
pub struct ViewUpdate {
    /// Changes in ascending document order.
    pub changes: Vec<Change>,
    pub viewport: Viewport,
    pub doc_changed: bool,
    pub viewport_changed: bool,
}

/// A line returned by [`LineSource::line_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The line without its terminator.
    pub range: TextRange,
    pub text: String,
    /// Start of the following line, `None` on the last line. The gap
    /// between `range.end` and this offset is the line terminator, which
    /// may be more than one character (`\r\n`).
    pub next_start: Option<usize>,
}

/// Line-indexed, read-only queries against the host's text buffer.
pub trait LineSource {
    /// Total length of the document.
    fn len(&self) -> usize;

    /// Whether the document is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The line containing `offset`.
    ///
    /// # Errors
    /// Returns [`QueryError::OffsetOutOfBounds`] when `offset > len()`.
    fn line_at(&self, offset: usize) -> Result<Line, QueryError>;

    /// The text between two offsets.
    ///
    /// # Errors
    /// Returns an error for reversed or out-of-bounds ranges.
    fn slice(&self, start: usize, end: usize) -> Result<String, QueryError>;

    /// Ranges of every line intersecting `from..=to`.
    ///
    /// # Errors
    /// Fails when `from` lies outside the document.
    fn line_ranges(&self, from: usize, to: usize) -> Result<Vec<TextRange>, QueryError> {
        let mut ranges = Vec::new();
        let last = to.min(self.len());
        let mut pos = from;
        while pos <= last {
            let line = self.line_at(pos)?;
            ranges.push(line.range);
            match line.next_start {
                Some(next) if next > pos => pos = next,
                _ => break,
            }
        }
        Ok(ranges)
    }
}
