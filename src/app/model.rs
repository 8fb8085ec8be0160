use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::decoration::{LineDecorations, LineSource, TextRange, Viewport};
use crate::direction::Direction;
use crate::editor::TextBuffer;

/// How lines are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionSettings {
    /// `Auto` detects per line; `Ltr`/`Rtl` force one direction.
    pub mode: Direction,
    /// Detection on or off while in `Auto` mode.
    pub auto: bool,
    /// Direction for directionless lines with nothing before them.
    pub default_direction: Direction,
}

impl Default for DirectionSettings {
    fn default() -> Self {
        Self {
            mode: Direction::Auto,
            auto: true,
            default_direction: Direction::Ltr,
        }
    }
}

/// The annotation of one line, as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineAnnotation {
    /// 1-based line number.
    pub line: usize,
    pub range: TextRange,
    pub direction: Option<Direction>,
    pub text: String,
}

/// A loaded file with its decoration cache.
#[derive(Debug)]
pub struct Model {
    pub file_path: PathBuf,
    pub buffer: TextBuffer,
    pub decorations: LineDecorations,
    pub settings: DirectionSettings,
}

impl Model {
    pub fn new(file_path: PathBuf, text: &str, settings: DirectionSettings) -> Self {
        let buffer = TextBuffer::from_text(text);
        let mut decorations =
            LineDecorations::new().with_default_direction(settings.default_direction);
        let viewport = Viewport::new(0, buffer.len());
        match settings.mode {
            Direction::Auto => decorations.activate(settings.auto, &buffer, viewport),
            forced => decorations.set_direction(forced, &buffer, viewport),
        }
        Self {
            file_path,
            buffer,
            decorations,
            settings,
        }
    }

    /// Load `path` from disk.
    ///
    /// # Errors
    /// Fails when the file cannot be read as UTF-8.
    pub fn open(path: &Path, settings: DirectionSettings) -> Result<Self> {
        let text = read_text(path)?;
        Ok(Self::new(path.to_path_buf(), &text, settings))
    }

    /// The whole document as one viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(0, self.buffer.len())
    }

    /// Replace the content with `text`, updating decorations incrementally.
    ///
    /// Returns whether anything changed.
    pub fn apply_text(&mut self, text: &str) -> bool {
        let Some(change) = self.buffer.set_text(text) else {
            return false;
        };
        debug!(?change, "content changed");
        self.decorations.on_edit(&self.buffer, &[change]);
        let viewport = self.viewport();
        self.decorations.on_viewport_change(&self.buffer, viewport);
        true
    }

    /// Re-read the file and apply the difference.
    ///
    /// # Errors
    /// Fails when the file cannot be read.
    pub fn reload_from_disk(&mut self) -> Result<bool> {
        let text = read_text(&self.file_path)?;
        Ok(self.apply_text(&text))
    }

    /// One annotation per line of the document.
    pub fn annotations(&mut self) -> Vec<LineAnnotation> {
        let ranges = match self.buffer.line_ranges(0, self.buffer.len()) {
            Ok(ranges) => ranges,
            Err(err) => {
                debug!(%err, "no lines");
                return Vec::new();
            }
        };
        ranges
            .into_iter()
            .enumerate()
            .map(|(idx, range)| {
                let direction = self
                    .decorations
                    .decoration_for(&self.buffer, range.start)
                    .and_then(|entry| entry.direction);
                LineAnnotation {
                    line: idx + 1,
                    range,
                    direction,
                    text: self.buffer.slice(range.start, range.end).unwrap_or_default(),
                }
            })
            .collect()
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
