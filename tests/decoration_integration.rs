use autodir::decoration::{LineDecorations, LineSource, TextRange, ViewUpdate, Viewport};
use autodir::direction::Direction;
use autodir::editor::TextBuffer;

fn full(buf: &TextBuffer) -> Viewport {
    Viewport::new(0, buf.len())
}

fn snapshot(decorations: &LineDecorations) -> Vec<(TextRange, Option<Direction>)> {
    decorations
        .entries()
        .iter()
        .map(|e| (e.range, e.direction))
        .collect()
}

/// Recompute everything from scratch for comparison.
fn fresh(buf: &TextBuffer) -> Vec<(TextRange, Option<Direction>)> {
    let mut decorations = LineDecorations::new();
    decorations.activate(true, buf, full(buf));
    snapshot(&decorations)
}

#[test]
fn test_typing_session_matches_fresh_computation() {
    let mut buf = TextBuffer::from_text("# Notes\n\n123\nhello");
    let mut decorations = LineDecorations::new();
    decorations.activate(true, &buf, full(&buf));

    let edits: [(usize, usize, &str); 5] = [
        (0, 0, "שלום "),
        (14, 14, "\n"),
        (15, 15, "עוד שורה"),
        (2, 7, ""),
        (0, 2, "# "),
    ];
    for (from, to, text) in edits {
        let change = buf.replace(from, to, text).unwrap();
        let update = ViewUpdate {
            changes: vec![change],
            viewport: full(&buf),
            doc_changed: true,
            viewport_changed: false,
        };
        decorations.update(&buf, &update);
        assert_eq!(
            snapshot(&decorations),
            fresh(&buf),
            "diverged after replacing {from}..{to} with {text:?}"
        );
    }
}

#[test]
fn test_multi_change_update() {
    let mut buf = TextBuffer::from_text("a\nb\nc");
    let mut decorations = LineDecorations::new();
    decorations.activate(true, &buf, full(&buf));

    let first = buf.insert(0, "שלום ").unwrap();
    let second = buf.replace(9, 10, "ג").unwrap();
    let update = ViewUpdate {
        changes: vec![first, second],
        viewport: full(&buf),
        doc_changed: true,
        viewport_changed: true,
    };
    decorations.update(&buf, &update);

    assert_eq!(
        snapshot(&decorations),
        vec![
            (TextRange::new(0, 6), Some(Direction::Rtl)),
            (TextRange::new(7, 8), Some(Direction::Ltr)),
            (TextRange::new(9, 10), Some(Direction::Rtl)),
        ]
    );
}

#[test]
fn test_scrolling_fills_only_visible_lines() {
    let text = (0..100)
        .map(|i| if i < 50 { "hello" } else { "שלום" })
        .collect::<Vec<_>>()
        .join("\n");
    let buf = TextBuffer::from_text(&text);
    let mut decorations = LineDecorations::new();
    decorations.activate(true, &buf, Viewport::new(0, 17));
    assert_eq!(decorations.len(), 3);

    let line_60 = buf.line_ranges(0, buf.len()).unwrap()[60];
    decorations.on_viewport_change(&buf, Viewport::new(line_60.start, line_60.end));
    assert_eq!(decorations.len(), 4);
    let entry = decorations.decoration_for(&buf, line_60.start).unwrap();
    assert_eq!(entry.direction, Some(Direction::Rtl));
}

#[test]
fn test_toggling_detection_round_trip() {
    let buf = TextBuffer::from_text("שלום\nhello");
    let mut decorations = LineDecorations::new();
    decorations.activate(true, &buf, full(&buf));
    decorations.activate(false, &buf, full(&buf));
    assert!(decorations.entries().iter().all(|e| e.direction.is_none()));
    decorations.set_direction(Direction::Auto, &buf, full(&buf));
    assert_eq!(snapshot(&decorations), fresh(&buf));
}

#[test]
fn test_crlf_typing_session_matches_fresh_computation() {
    let mut buf = TextBuffer::from_text("hello\r\n\r\n123\r\nworld");
    let mut decorations = LineDecorations::new();
    decorations.activate(true, &buf, full(&buf));

    let edits: [(usize, usize, &str); 4] = [
        (0, 0, "שלום "),
        (12, 12, "\r\n"),
        (0, 5, ""),
        (7, 9, ""),
    ];
    for (from, to, text) in edits {
        let change = buf.replace(from, to, text).unwrap();
        decorations.update(
            &buf,
            &ViewUpdate {
                changes: vec![change],
                viewport: full(&buf),
                doc_changed: true,
                viewport_changed: true,
            },
        );
        assert_eq!(snapshot(&decorations), fresh(&buf), "after {text:?} at {from}");
    }
}
