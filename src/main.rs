//! Autodir - Annotate markdown with per-line and per-block writing direction.
//!
//! # Usage
//!
//! ```bash
//! autodir notes.md
//! autodir --json notes.md
//! autodir --html --watch notes.md
//! autodir --direction rtl --save notes.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use autodir::app::{App, OutputFormat};
use autodir::config::{
    ConfigFlags, clear_config_flags, default_dir_arg, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use autodir::direction::Direction;

/// Detect the writing direction of markdown lines and blocks
#[derive(Parser, Debug)]
#[command(name = "autodir", version, about, long_about = None)]
struct Cli {
    /// Markdown file to annotate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and re-annotate
    #[arg(short, long)]
    watch: bool,

    /// Print the rendered preview as HTML with direction classes
    #[arg(long, conflicts_with = "json")]
    html: bool,

    /// Print line annotations as JSON
    #[arg(long)]
    json: bool,

    /// Document direction: detect per line, or force one direction
    #[arg(long, value_enum)]
    direction: Option<Direction>,

    /// Direction of leading lines without strong characters (ltr or rtl)
    #[arg(long, value_name = "DIR", value_parser = default_dir_arg)]
    default_dir: Option<Direction>,

    /// Disable automatic detection
    #[arg(long)]
    no_auto: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    /// The flags given on this command line, as saved by `--save`.
    const fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            html: self.html,
            json: self.json,
            no_auto: self.no_auto,
            direction: self.direction,
            default_dir: self.default_dir,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so annotations on stdout stay clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_format(OutputFormat::from_flags(effective.html, effective.json))
        .with_direction(effective.direction.unwrap_or(Direction::Auto))
        .with_auto(!effective.no_auto)
        .with_default_direction(effective.default_dir.unwrap_or(Direction::Ltr));

    app.run().context("Application error")
}
