use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::direction::Direction;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub html: bool,
    pub json: bool,
    pub no_auto: bool,
    pub direction: Option<Direction>,
    pub default_dir: Option<Direction>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            html: self.html || other.html,
            json: self.json || other.json,
            no_auto: self.no_auto || other.no_auto,
            direction: other.direction.or(self.direction),
            default_dir: other.default_dir.or(self.default_dir),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("autodir").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("autodir")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("autodir").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("autodir")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".autodirrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# autodir defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.html {
        lines.push("--html".to_string());
    }
    if flags.json {
        lines.push("--json".to_string());
    }
    if flags.no_auto {
        lines.push("--no-auto".to_string());
    }
    if let Some(direction) = flags.direction {
        lines.push(format!("--direction {direction}"));
    }
    if let Some(direction) = flags.default_dir {
        lines.push(format!("--default-dir {direction}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags this module persists out of a raw argument list.
///
/// Unknown tokens (the program name, the file argument, `--save`) are
/// skipped, as are values that do not name a valid direction.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--watch" => flags.watch = true,
            "--html" => flags.html = true,
            "--json" => flags.json = true,
            "--no-auto" => flags.no_auto = true,
            "--direction" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.direction = Direction::parse(next);
                    i += 1;
                }
            }
            "--default-dir" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.default_dir = parse_default_dir(next);
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--direction=") {
                    flags.direction = Direction::parse(value);
                } else if let Some(value) = token.strip_prefix("--default-dir=") {
                    flags.default_dir = parse_default_dir(value);
                }
            }
        }
        i += 1;
    }
    flags
}

/// The default line direction is never `auto`.
fn parse_default_dir(s: &str) -> Option<Direction> {
    Direction::parse(s).filter(|d| *d != Direction::Auto)
}

/// Value parser for `--default-dir`, sharing the rules of flag files.
///
/// # Errors
/// Rejects anything but `ltr` and `rtl`.
pub fn default_dir_arg(s: &str) -> Result<Direction, String> {
    parse_default_dir(s).ok_or_else(|| format!("expected `ltr` or `rtl`, got `{s}`"))
}
