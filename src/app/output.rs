use std::fmt::Write as _;

use anyhow::{Context, Result};

use super::model::{LineAnnotation, Model};
use crate::direction::Direction;
use crate::preview::{Preview, render_html};

/// What the CLI prints for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per source line, prefixed with its direction.
    #[default]
    Plain,
    /// The line annotations as a JSON array.
    Json,
    /// The rendered markdown preview with direction classes.
    Html,
}

impl OutputFormat {
    pub const fn from_flags(html: bool, json: bool) -> Self {
        if html {
            Self::Html
        } else if json {
            Self::Json
        } else {
            Self::Plain
        }
    }
}

/// Render the current state of `model`.
///
/// # Errors
/// Fails only when JSON serialization fails.
pub fn render(model: &mut Model, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Plain => Ok(plain(&model.annotations())),
        OutputFormat::Json => serde_json::to_string_pretty(&model.annotations())
            .context("Failed to serialize annotations"),
        OutputFormat::Html => Ok(html(model)),
    }
}

fn plain(annotations: &[LineAnnotation]) -> String {
    let mut out = String::new();
    for annotation in annotations {
        let label = annotation.direction.map_or("-", Direction::as_str);
        let _ = writeln!(out, "{label:<4} {}", annotation.text);
    }
    out
}

fn html(model: &Model) -> String {
    let settings = model.settings;
    let text = model.buffer.text();
    if settings.mode == Direction::Auto && !settings.auto {
        return Preview::parse(&text).html();
    }
    render_html(&text, settings.mode, settings.default_direction)
}
