//! Writing direction detection.
//!
//! Detection follows the paragraph-level "first strong character" rule:
//! the first character belonging to a known script decides the direction.
//! Markdown syntax that carries no prose (a checked task marker, the target
//! of a named wiki link) is removed before scanning.

mod scripts;

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use scripts::{LTR_SCRIPTS, RTL_SCRIPTS, ScriptTable};

/// Checked task marker; its `x` would otherwise read as Latin.
const CHECKED_TASK_MARKER: &str = "- [x]";

static NAMED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[[^\]]*\|([^\]]*)\]\]").expect("named link pattern is valid")
});

pub(crate) static DEFAULT_TABLE: LazyLock<ScriptTable> = LazyLock::new(ScriptTable::default);

/// A writing direction.
///
/// `Auto` is a request to detect per line or node; detection itself only
/// ever yields `Ltr` or `Rtl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
    Auto,
}

impl Direction {
    /// The HTML `dir` attribute value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
            Self::Auto => "auto",
        }
    }

    /// Parse a `dir` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ltr" => Some(Self::Ltr),
            "rtl" => Some(Self::Rtl),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove text that should not influence detection.
///
/// The first named wiki link is reduced to its display text and the first
/// checked task marker is dropped.
///
/// ```
/// use autodir::direction::strip_meaningless;
///
/// assert_eq!(strip_meaningless("- [x] Hi"), " Hi");
/// assert_eq!(strip_meaningless("[[file.pdf|name]] abc"), "name abc");
/// assert_eq!(strip_meaningless("[[file.pdf]] abc"), "[[file.pdf]] abc");
/// ```
pub fn strip_meaningless(text: &str) -> Cow<'_, str> {
    let mut cleaned = NAMED_LINK.replace(text, "$1");
    if cleaned.contains(CHECKED_TASK_MARKER) {
        cleaned = Cow::Owned(cleaned.replacen(CHECKED_TASK_MARKER, "", 1));
    }
    cleaned
}

/// Detect the direction of `text` with the default script table.
///
/// Returns `None` when the text has no strong character.
///
/// ```
/// use autodir::direction::{detect, Direction};
///
/// assert_eq!(detect("- [x] שלום"), Some(Direction::Rtl));
/// assert_eq!(detect("hello שלום"), Some(Direction::Ltr));
/// assert_eq!(detect("42."), None);
/// ```
pub fn detect(text: &str) -> Option<Direction> {
    detect_with(&DEFAULT_TABLE, text)
}

/// Detect the direction of `text` with a custom script table.
pub fn detect_with(table: &ScriptTable, text: &str) -> Option<Direction> {
    table.first_strong(&strip_meaningless(text))
}
