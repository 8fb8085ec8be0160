//! The command-line session.
//!
//! - [`Model`]: the loaded file, its buffer and decoration cache
//! - [`OutputFormat`]: plain, JSON or HTML output
//! - [`App::run`]: print once, or keep re-annotating while watching

mod model;
mod output;

#[cfg(test)]
mod tests;

pub use model::{DirectionSettings, LineAnnotation, Model};
pub use output::{OutputFormat, render};

use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::direction::Direction;
use crate::watcher::FileWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL: Duration = Duration::from_millis(250);

/// Application entry point.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    format: OutputFormat,
    settings: DirectionSettings,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            format: OutputFormat::default(),
            settings: DirectionSettings::default(),
        }
    }

    /// Enable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the direction mode (`Auto` detects, `Ltr`/`Rtl` force).
    pub const fn with_direction(mut self, mode: Direction) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Turn per-line detection on or off.
    pub const fn with_auto(mut self, enabled: bool) -> Self {
        self.settings.auto = enabled;
        self
    }

    pub const fn with_default_direction(mut self, direction: Direction) -> Self {
        self.settings.default_direction = direction;
        self
    }

    /// Print annotations to stdout.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or stdout cannot be
    /// written.
    pub fn run(&self) -> Result<()> {
        let mut out = stdout().lock();
        self.run_with(&mut out)
    }

    /// Print annotations to `out`, then follow the file when watching.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or `out` cannot be
    /// written.
    pub fn run_with(&self, out: &mut impl Write) -> Result<()> {
        let mut model = Model::open(&self.file_path, self.settings)?;
        emit(out, &mut model, self.format)?;
        if !self.watch_enabled {
            return Ok(());
        }

        let mut watcher = FileWatcher::new(&self.file_path, WATCH_DEBOUNCE)
            .with_context(|| format!("Failed to watch {}", self.file_path.display()))?;
        info!(path = %watcher.target_path().display(), "watching for changes");
        loop {
            if !watcher.wait_for_change(WATCH_POLL, None) {
                continue;
            }
            match model.reload_from_disk() {
                Ok(true) => emit(out, &mut model, self.format)?,
                Ok(false) => {}
                Err(err) => warn!(%err, "reload failed"),
            }
        }
    }
}

fn emit(out: &mut impl Write, model: &mut Model, format: OutputFormat) -> Result<()> {
    let mut rendered = render(model, format)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    out.write_all(rendered.as_bytes())
        .context("Failed to write output")?;
    out.flush().context("Failed to write output")
}
