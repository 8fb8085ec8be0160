use ropey::Rope;

use crate::decoration::{Change, Line, LineSource, QueryError, TextRange};

/// A text buffer backed by a rope data structure.
///
/// Offsets are char indices. Every edit returns the [`Change`] it made so
/// the caller can forward it to a decoration cache.
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Total length in chars.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Insert `text` at `at`.
    ///
    /// # Errors
    /// Fails when `at` is past the end of the buffer.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<Change, QueryError> {
        self.replace(at, at, text)
    }

    /// Delete `from..to`.
    ///
    /// # Errors
    /// Fails for reversed or out-of-bounds ranges.
    pub fn delete(&mut self, from: usize, to: usize) -> Result<Change, QueryError> {
        self.replace(from, to, "")
    }

    /// Replace `from..to` with `text`.
    ///
    /// # Errors
    /// Fails for reversed or out-of-bounds ranges.
    pub fn replace(&mut self, from: usize, to: usize, text: &str) -> Result<Change, QueryError> {
        self.check_range(from, to)?;
        if from < to {
            self.rope.remove(from..to);
        }
        if !text.is_empty() {
            self.rope.insert(from, text);
        }
        Ok(Change::new(from, to, from, from + text.chars().count()))
    }

    /// Replace the whole content, returning the single change that turns
    /// the old text into `text`, or `None` when nothing differs.
    ///
    /// The common prefix and suffix are kept, so the change covers only
    /// the span that actually differs.
    pub fn set_text(&mut self, text: &str) -> Option<Change> {
        let old_len = self.len();
        let new_len = text.chars().count();

        let prefix = self
            .rope
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a == b)
            .count();
        if prefix == old_len && prefix == new_len {
            return None;
        }
        let max_suffix = (old_len - prefix).min(new_len - prefix);
        let mut back = self.rope.chars_at(old_len);
        let suffix = std::iter::from_fn(|| back.prev())
            .zip(text.chars().rev())
            .take_while(|(a, b)| a == b)
            .take(max_suffix)
            .count();

        let inserted: String = text
            .chars()
            .skip(prefix)
            .take(new_len - suffix - prefix)
            .collect();
        self.replace(prefix, old_len - suffix, &inserted).ok()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        let len = self.len();
        if end > len {
            return Err(QueryError::OffsetOutOfBounds { offset: end, len });
        }
        Ok(())
    }
}

impl LineSource for TextBuffer {
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_at(&self, offset: usize) -> Result<Line, QueryError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(QueryError::OffsetOutOfBounds { offset, len });
        }
        let line_idx = self.rope.char_to_line(offset);
        let start = self.rope.line_to_char(line_idx);
        let raw = self.rope.line(line_idx).to_string();
        let text = strip_line_break(&raw).to_string();
        let end = start + text.chars().count();
        let next_start =
            (line_idx + 1 < self.rope.len_lines()).then(|| self.rope.line_to_char(line_idx + 1));
        Ok(Line {
            range: TextRange::new(start, end),
            text,
            next_start,
        })
    }

    fn slice(&self, start: usize, end: usize) -> Result<String, QueryError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }
}

/// Drop the line break ropey ended `line` with, if any.
fn strip_line_break(line: &str) -> &str {
    if let Some(rest) = line.strip_suffix("\r\n") {
        return rest;
    }
    line.strip_suffix(['\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}'])
        .unwrap_or(line)
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = TextBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        let line = buf.line_at(0).unwrap();
        assert_eq!(line.range, TextRange::new(0, 0));
        assert_eq!(line.text, "");
    }

    #[test]
    fn test_line_at_reports_range_without_newline() {
        let buf = TextBuffer::from_text("hello\nworld");
        let line = buf.line_at(2).unwrap();
        assert_eq!(line.range, TextRange::new(0, 5));
        assert_eq!(line.text, "hello");
        let line = buf.line_at(6).unwrap();
        assert_eq!(line.range, TextRange::new(6, 11));
        assert_eq!(line.text, "world");
    }

    #[test]
    fn test_line_at_newline_position_belongs_to_line() {
        let buf = TextBuffer::from_text("hello\nworld");
        assert_eq!(buf.line_at(5).unwrap().range, TextRange::new(0, 5));
    }

    #[test]
    fn test_line_at_end_of_trailing_newline_is_empty_line() {
        let buf = TextBuffer::from_text("hello\n");
        assert_eq!(buf.line_at(6).unwrap().range, TextRange::new(6, 6));
    }

    #[test]
    fn test_line_at_counts_chars_not_bytes() {
        let buf = TextBuffer::from_text("שלום\nabc");
        assert_eq!(buf.line_at(0).unwrap().range, TextRange::new(0, 4));
        assert_eq!(buf.line_at(5).unwrap().range, TextRange::new(5, 8));
    }

    #[test]
    fn test_line_at_out_of_bounds_is_error() {
        let buf = TextBuffer::from_text("hello");
        assert_eq!(
            buf.line_at(6),
            Err(QueryError::OffsetOutOfBounds { offset: 6, len: 5 })
        );
    }

    #[test]
    fn test_crlf_line_excludes_carriage_return() {
        let buf = TextBuffer::from_text("ab\r\ncd");
        let line = buf.line_at(0).unwrap();
        assert_eq!(line.text, "ab");
        assert_eq!(line.range, TextRange::new(0, 2));
    }

    #[test]
    fn test_line_at_reports_next_line_start() {
        let buf = TextBuffer::from_text("ab\r\ncd\nef");
        assert_eq!(buf.line_at(0).unwrap().next_start, Some(4));
        assert_eq!(buf.line_at(3).unwrap().next_start, Some(4));
        assert_eq!(buf.line_at(4).unwrap().next_start, Some(7));
        assert_eq!(buf.line_at(8).unwrap().next_start, None);
    }

    #[test]
    fn test_unicode_line_separators_are_excluded() {
        let buf = TextBuffer::from_text("ab\u{2028}cd\u{85}ef");
        let line = buf.line_at(0).unwrap();
        assert_eq!(line.text, "ab");
        assert_eq!(line.range, TextRange::new(0, 2));
        assert_eq!(line.next_start, Some(3));
        assert_eq!(buf.line_at(3).unwrap().range, TextRange::new(3, 5));
    }

    #[test]
    fn test_line_ranges_over_crlf_text() {
        let buf = TextBuffer::from_text("hello\r\nשלום\r\n");
        let ranges = buf.line_ranges(0, buf.len()).unwrap();
        assert_eq!(
            ranges,
            vec![TextRange::new(0, 5), TextRange::new(7, 11), TextRange::new(13, 13)]
        );
    }

    #[test]
    fn test_slice() {
        let buf = TextBuffer::from_text("hello world");
        assert_eq!(buf.slice(6, 11).unwrap(), "world");
        assert!(buf.slice(6, 20).is_err());
        assert_eq!(
            buf.slice(4, 2),
            Err(QueryError::InvalidRange { start: 4, end: 2 })
        );
    }

    #[test]
    fn test_line_ranges_cover_requested_span() {
        let buf = TextBuffer::from_text("a\nbb\nccc\nd");
        let ranges = buf.line_ranges(1, 6).unwrap();
        assert_eq!(
            ranges,
            vec![TextRange::new(0, 1), TextRange::new(2, 4), TextRange::new(5, 8)]
        );
    }

    // --- Edits ---

    #[test]
    fn test_insert_reports_change() {
        let mut buf = TextBuffer::from_text("hello");
        let change = buf.insert(5, " שלום").unwrap();
        assert_eq!(buf.text(), "hello שלום");
        assert_eq!(change, Change::new(5, 5, 5, 10));
    }

    #[test]
    fn test_delete_reports_change() {
        let mut buf = TextBuffer::from_text("hello\nworld");
        let change = buf.delete(5, 6).unwrap();
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(change, Change::delete(5, 6));
    }

    #[test]
    fn test_replace_reports_change() {
        let mut buf = TextBuffer::from_text("hello world");
        let change = buf.replace(0, 5, "hi").unwrap();
        assert_eq!(buf.text(), "hi world");
        assert_eq!(change, Change::new(0, 5, 0, 2));
    }

    #[test]
    fn test_edit_out_of_bounds_leaves_buffer_untouched() {
        let mut buf = TextBuffer::from_text("hello");
        assert!(buf.insert(9, "x").is_err());
        assert!(buf.delete(3, 1).is_err());
        assert_eq!(buf.text(), "hello");
    }

    // --- Whole-text replacement ---

    #[test]
    fn test_set_text_identical_is_none() {
        let mut buf = TextBuffer::from_text("same");
        assert_eq!(buf.set_text("same"), None);
    }

    #[test]
    fn test_set_text_finds_middle_edit() {
        let mut buf = TextBuffer::from_text("one\ntwo\nthree");
        let change = buf.set_text("one\nTWO!\nthree").unwrap();
        assert_eq!(buf.text(), "one\nTWO!\nthree");
        assert_eq!(change, Change::new(4, 7, 4, 8));
    }

    #[test]
    fn test_set_text_append() {
        let mut buf = TextBuffer::from_text("abc");
        let change = buf.set_text("abc\nשלום").unwrap();
        assert_eq!(change, Change::insert(3, 5));
    }

    #[test]
    fn test_set_text_repeated_chars_do_not_overlap() {
        let mut buf = TextBuffer::from_text("aaa");
        let change = buf.set_text("aaaa").unwrap();
        assert_eq!(buf.text(), "aaaa");
        assert_eq!(change.amount(), 1);
    }

    #[test]
    fn test_set_text_truncate() {
        let mut buf = TextBuffer::from_text("hello world");
        let change = buf.set_text("hello").unwrap();
        assert_eq!(buf.text(), "hello");
        assert_eq!(change, Change::delete(5, 11));
    }
}
