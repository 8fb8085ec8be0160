//! Lightweight editable text buffer.
//!
//! Provides a rope-backed buffer that answers the line queries a
//! decoration cache needs and reports every edit as a [`Change`].
//!
//! [`Change`]: crate::decoration::Change

mod buffer;

pub use buffer::TextBuffer;
