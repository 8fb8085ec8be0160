//! The per-editor decoration cache.

use tracing::{debug, trace, warn};

use super::{Change, DecorationEntry, LineSource, TextRange, ViewUpdate, Viewport};
use crate::direction::{Direction, ScriptTable, detect_with};

/// Direction decorations for the lines of one editor instance.
///
/// Entries are kept sorted by line start with at most one entry per start.
/// Lines outside the viewport stay cached so scrolling back is free.
///
/// # Example
///
/// ```
/// use autodir::decoration::{LineDecorations, Viewport};
/// use autodir::direction::Direction;
/// use autodir::editor::TextBuffer;
///
/// let buf = TextBuffer::from_text("שלום\n123\nhello");
/// let mut decorations = LineDecorations::new();
/// decorations.activate(true, &buf, Viewport::new(0, buf.len()));
///
/// let dirs: Vec<_> = decorations.entries().iter().map(|e| e.direction).collect();
/// assert_eq!(dirs, vec![Some(Direction::Rtl), Some(Direction::Rtl), Some(Direction::Ltr)]);
/// ```
#[derive(Debug, Clone)]
pub struct LineDecorations {
    entries: Vec<DecorationEntry>,
    active: bool,
    /// Fixed direction applied to every line, bypassing detection.
    forced: Option<Direction>,
    default_direction: Direction,
    table: ScriptTable,
}

impl LineDecorations {
    /// An empty, inactive cache defaulting to left-to-right.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            active: false,
            forced: None,
            default_direction: Direction::Ltr,
            table: ScriptTable::default(),
        }
    }

    /// Direction given to directionless lines with no preceding entry.
    #[must_use]
    pub const fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Use a custom script table for detection.
    #[must_use]
    pub fn with_script_table(mut self, table: ScriptTable) -> Self {
        self.table = table;
        self
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn default_direction(&self) -> Direction {
        self.default_direction
    }

    /// The current mode: a forced direction, or `Auto` while detecting.
    pub const fn direction_mode(&self) -> Direction {
        match self.forced {
            Some(direction) => direction,
            None => Direction::Auto,
        }
    }

    /// Cached entries, ordered by line start.
    pub fn entries(&self) -> &[DecorationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `(line start, dir attribute)` mark per cached line, in order.
    pub fn marks(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.range.start, entry.dir_attribute()))
    }

    /// Turn detection on or off.
    ///
    /// A real transition drops every entry and recomputes the viewport;
    /// setting the current state again does nothing.
    pub fn activate(&mut self, active: bool, doc: &impl LineSource, viewport: Viewport) {
        if self.active == active {
            return;
        }
        self.active = active;
        debug!(active, "auto direction toggled");
        self.invalidate(doc, viewport);
    }

    /// Set the document direction mode.
    ///
    /// `Auto` enables detection; `Ltr` and `Rtl` decorate every line with
    /// that direction.
    pub fn set_direction(&mut self, direction: Direction, doc: &impl LineSource, viewport: Viewport) {
        let before = (self.forced, self.active);
        match direction {
            Direction::Auto => {
                self.forced = None;
                self.active = true;
            }
            fixed => self.forced = Some(fixed),
        }
        if before != (self.forced, self.active) {
            debug!(%direction, "direction mode changed");
            self.invalidate(doc, viewport);
        }
    }

    /// Handle one host update notification.
    pub fn update(&mut self, doc: &impl LineSource, update: &ViewUpdate) {
        if !update.doc_changed && !update.viewport_changed {
            return;
        }
        if update.doc_changed {
            self.on_edit(doc, &update.changes);
        }
        self.on_viewport_change(doc, update.viewport);
    }

    /// Shift cached entries past each change and recompute the lines the
    /// changes landed in. `doc` is the document after all changes.
    pub fn on_edit(&mut self, doc: &impl LineSource, changes: &[Change]) {
        let mut touched = Vec::new();
        for change in changes {
            self.evict_replaced(change);
            let delta = change.delta();
            self.shift(delta.anchor, delta.amount);

            match doc.line_ranges(change.from_new, change.to_new) {
                Ok(ranges) => touched.extend(ranges),
                Err(err) => debug!(%err, ?change, "edited lines unavailable"),
            }
        }
        touched.sort_by_key(|range| range.start);
        touched.dedup();
        debug!(changes = changes.len(), lines = touched.len(), "recomputing edited lines");
        self.refresh(doc, &touched);
    }

    /// Make sure every line in `viewport` has an entry.
    ///
    /// Only missing lines are computed; nothing outside the viewport is
    /// evicted.
    pub fn on_viewport_change(&mut self, doc: &impl LineSource, viewport: Viewport) {
        let ranges = match doc.line_ranges(viewport.from, viewport.to) {
            Ok(ranges) => ranges,
            Err(err) => {
                debug!(%err, ?viewport, "viewport lines unavailable");
                return;
            }
        };
        let missing: Vec<TextRange> = ranges
            .into_iter()
            .filter(|range| self.entry_at(range.start).is_none_or(|e| e.range != *range))
            .collect();
        if !missing.is_empty() {
            debug!(lines = missing.len(), "filling viewport");
            self.refresh(doc, &missing);
        }
    }

    /// The entry covering `position`, computed on demand when absent.
    ///
    /// Returns `None` when the position is outside the document.
    pub fn decoration_for(&mut self, doc: &impl LineSource, position: usize) -> Option<DecorationEntry> {
        let idx = self.entries.partition_point(|e| e.range.start <= position);
        if let Some(entry) = idx.checked_sub(1).map(|i| self.entries[i]) {
            if entry.range.covers(position) {
                return Some(entry);
            }
        }

        let line = match doc.line_at(position) {
            Ok(line) => line,
            Err(err) => {
                debug!(%err, "no decoration");
                return None;
            }
        };
        let entry = self.compute(doc, line.range)?;
        self.upsert(entry);
        Some(entry)
    }

    /// Insert `entry` at its sorted position, replacing an entry with the
    /// same start.
    ///
    /// Entries starting strictly inside the new line are dropped, since
    /// they can no longer be line starts.
    pub fn upsert(&mut self, entry: DecorationEntry) {
        debug_assert!(
            entry.range.is_valid(),
            "malformed decoration range {:?}",
            entry.range
        );
        if !entry.range.is_valid() {
            warn!(range = ?entry.range, "skipping malformed decoration");
            return;
        }

        let start = entry.range.start;
        let idx = match self.entries.binary_search_by_key(&start, |e| e.range.start) {
            Ok(idx) => {
                self.entries[idx] = entry;
                idx
            }
            Err(idx) => {
                self.entries.insert(idx, entry);
                idx
            }
        };

        let overlapped = self.entries[idx + 1..]
            .iter()
            .take_while(|e| e.range.start <= entry.range.end)
            .count();
        if overlapped > 0 {
            trace!(start, overlapped, "dropping stale entries inside line");
            self.entries.drain(idx + 1..idx + 1 + overlapped);
        }
    }

    /// Translate entries starting at or after `pivot` by `amount`.
    ///
    /// An entry whose translated start lands at or below the pivot was
    /// merged away by a deletion and is evicted.
    pub fn shift(&mut self, pivot: usize, amount: isize) {
        if amount == 0 {
            return;
        }
        let before = self.entries.len();
        self.entries.retain_mut(|entry| {
            if entry.range.start < pivot {
                return true;
            }
            entry.range = entry.range.shifted(amount);
            entry.range.start > pivot
        });
        trace!(pivot, amount, evicted = before - self.entries.len(), "shifted");
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn invalidate(&mut self, doc: &impl LineSource, viewport: Viewport) {
        self.entries.clear();
        self.on_viewport_change(doc, viewport);
    }

    fn entry_at(&self, start: usize) -> Option<&DecorationEntry> {
        self.entries
            .binary_search_by_key(&start, |e| e.range.start)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Evict entries whose line start lay strictly inside replaced text.
    fn evict_replaced(&mut self, change: &Change) {
        let replaced_end = change.from_new + (change.to_old - change.from_old);
        if replaced_end <= change.from_new + 1 {
            return;
        }
        self.entries
            .retain(|e| e.range.start <= change.from_new || e.range.start >= replaced_end);
    }

    /// Recompute and store the given line ranges, in ascending order.
    fn refresh(&mut self, doc: &impl LineSource, ranges: &[TextRange]) {
        for range in ranges {
            let Some(entry) = self.compute(doc, *range) else {
                continue;
            };
            self.upsert(entry);
            self.carry_forward_from(doc, range.start);
        }
    }

    /// Push the direction of the entry at `start` into the run of inherited
    /// entries after it, as long as each one is the next line of the
    /// document.
    fn carry_forward_from(&mut self, doc: &impl LineSource, start: usize) {
        let Ok(idx) = self.entries.binary_search_by_key(&start, |e| e.range.start) else {
            return;
        };
        let direction = self.entries[idx].direction;
        let mut prev_end = self.entries[idx].range.end;
        for entry in &mut self.entries[idx + 1..] {
            if !entry.inherited {
                break;
            }
            let next_start = doc.line_at(prev_end).ok().and_then(|line| line.next_start);
            if next_start != Some(entry.range.start) {
                break;
            }
            entry.direction = direction;
            prev_end = entry.range.end;
        }
    }

    /// Decoration of one line.
    fn compute(&self, doc: &impl LineSource, range: TextRange) -> Option<DecorationEntry> {
        if let Some(forced) = self.forced {
            return Some(DecorationEntry::new(range, Some(forced)));
        }
        if !self.active {
            return Some(DecorationEntry::new(range, None));
        }

        let text = match doc.slice(range.start, range.end) {
            Ok(text) => text,
            Err(err) => {
                debug!(%err, ?range, "line text unavailable");
                return None;
            }
        };
        let entry = match detect_with(&self.table, &text) {
            Some(direction) => DecorationEntry::new(range, Some(direction)),
            None => DecorationEntry::inherited(range, self.preceding_direction(range.start)),
        };
        trace!(start = range.start, dir = entry.dir_attribute(), inherited = entry.inherited, "line");
        Some(entry)
    }

    /// Direction of the nearest cached line starting before `start`.
    fn preceding_direction(&self, start: usize) -> Option<Direction> {
        let idx = self.entries.partition_point(|e| e.range.start < start);
        match idx.checked_sub(1) {
            Some(prev) => self.entries[prev].direction,
            None => Some(self.default_direction),
        }
    }
}

impl Default for LineDecorations {
    fn default() -> Self {
        Self::new()
    }
}
