// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. decoration::DecorationEntry)
    clippy::module_name_repetitions
)]

//! # Autodir
//!
//! Automatic writing-direction detection for markdown text.
//!
//! Autodir works at two levels:
//! - Per line, in an editable buffer, with a cache that is updated
//!   incrementally as the text changes
//! - Per block, over a rendered node tree, assigning direction classes
//!
//! ## Modules
//!
//! - [`direction`]: First-strong-character detection
//! - [`decoration`]: Incremental per-line decoration cache
//! - [`dom`]: Node tree and block direction classifier
//! - [`editor`]: Rope-backed text buffer
//! - [`preview`]: Markdown rendering to a node tree
//! - [`config`]: Persisted command-line defaults
//! - [`watcher`]: File watching
//! - [`app`]: Command-line session

pub mod app;
pub mod config;
pub mod decoration;
pub mod direction;
pub mod dom;
pub mod editor;
pub mod preview;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::decoration::{Change, DecorationEntry, LineDecorations, LineSource, Viewport};
    pub use crate::direction::{Direction, detect};
    pub use crate::dom::{Tree, classify};
    pub use crate::editor::TextBuffer;
}
