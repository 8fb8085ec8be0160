use std::path::PathBuf;

use tempfile::tempdir;

use crate::decoration::TextRange;
use crate::direction::Direction;

use super::{App, DirectionSettings, Model, OutputFormat, render};

fn create_test_model(text: &str) -> Model {
    Model::new(PathBuf::from("test.md"), text, DirectionSettings::default())
}

fn directions(model: &mut Model) -> Vec<Option<Direction>> {
    model
        .annotations()
        .into_iter()
        .map(|a| a.direction)
        .collect()
}

#[test]
fn test_annotations_follow_detection_and_carry_forward() {
    let mut model = create_test_model("שלום\n123\nhello");
    assert_eq!(
        directions(&mut model),
        vec![Some(Direction::Rtl), Some(Direction::Rtl), Some(Direction::Ltr)]
    );
}

#[test]
fn test_annotation_ranges_and_numbers() {
    let mut model = create_test_model("ab\nשלום");
    let annotations = model.annotations();
    assert_eq!(annotations[1].line, 2);
    assert_eq!(annotations[1].range, TextRange::new(3, 7));
    assert_eq!(annotations[1].text, "שלום");
}

#[test]
fn test_annotations_of_crlf_file() {
    let mut model = create_test_model("hello\r\nשלום\r\n42\r\n");
    let annotations = model.annotations();
    assert_eq!(annotations.len(), 4);
    assert_eq!(annotations[1].range, TextRange::new(7, 11));
    assert_eq!(annotations[1].text, "שלום");
    assert_eq!(
        annotations.iter().map(|a| a.direction).collect::<Vec<_>>(),
        vec![
            Some(Direction::Ltr),
            Some(Direction::Rtl),
            Some(Direction::Rtl),
            Some(Direction::Rtl),
        ]
    );
}

#[test]
fn test_detection_off_leaves_lines_neutral() {
    let settings = DirectionSettings {
        auto: false,
        ..DirectionSettings::default()
    };
    let mut model = Model::new(PathBuf::from("t.md"), "שלום\nhello", settings);
    assert_eq!(directions(&mut model), vec![None, None]);
}

#[test]
fn test_forced_direction_applies_to_every_line() {
    let settings = DirectionSettings {
        mode: Direction::Rtl,
        ..DirectionSettings::default()
    };
    let mut model = Model::new(PathBuf::from("t.md"), "hello\nworld", settings);
    assert_eq!(
        directions(&mut model),
        vec![Some(Direction::Rtl), Some(Direction::Rtl)]
    );
}

#[test]
fn test_default_direction_for_leading_neutral_lines() {
    let settings = DirectionSettings {
        default_direction: Direction::Rtl,
        ..DirectionSettings::default()
    };
    let mut model = Model::new(PathBuf::from("t.md"), "123\nhello", settings);
    assert_eq!(
        directions(&mut model),
        vec![Some(Direction::Rtl), Some(Direction::Ltr)]
    );
}

#[test]
fn test_apply_text_updates_incrementally() {
    let mut model = create_test_model("hello\n42");
    assert!(model.apply_text("שלום\n42"));
    assert_eq!(
        directions(&mut model),
        vec![Some(Direction::Rtl), Some(Direction::Rtl)]
    );
    assert!(!model.apply_text("שלום\n42"));
}

#[test]
fn test_apply_text_appending_lines() {
    let mut model = create_test_model("hello");
    assert!(model.apply_text("hello\nשלום\n7"));
    assert_eq!(
        directions(&mut model),
        vec![Some(Direction::Ltr), Some(Direction::Rtl), Some(Direction::Rtl)]
    );
}

#[test]
fn test_reload_from_disk_applies_file_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "hello\n").unwrap();
    let mut model = Model::open(&path, DirectionSettings::default()).unwrap();

    std::fs::write(&path, "hello\nשלום\n").unwrap();
    assert!(model.reload_from_disk().unwrap());
    assert_eq!(model.buffer.text(), "hello\nשלום\n");
    assert_eq!(directions(&mut model)[1], Some(Direction::Rtl));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempdir().unwrap();
    let err = Model::open(&dir.path().join("nope.md"), DirectionSettings::default());
    assert!(err.is_err());
}

#[test]
fn test_plain_output() {
    let mut model = create_test_model("שלום\n123\nhello");
    let out = render(&mut model, OutputFormat::Plain).unwrap();
    assert_eq!(out, "rtl  שלום\nrtl  123\nltr  hello\n");
}

#[test]
fn test_plain_output_marks_neutral_lines() {
    let settings = DirectionSettings {
        auto: false,
        ..DirectionSettings::default()
    };
    let mut model = Model::new(PathBuf::from("t.md"), "hi", settings);
    let out = render(&mut model, OutputFormat::Plain).unwrap();
    assert_eq!(out, "-    hi\n");
}

#[test]
fn test_json_output() {
    let mut model = create_test_model("שלום\nhello");
    let out = render(&mut model, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["direction"], "rtl");
    assert_eq!(value[0]["range"]["start"], 0);
    assert_eq!(value[1]["direction"], "ltr");
    assert_eq!(value[1]["text"], "hello");
}

#[test]
fn test_html_output_is_classified() {
    let mut model = create_test_model("שלום\n\nhello\n");
    let out = render(&mut model, OutputFormat::Html).unwrap();
    assert!(out.contains(r#"<p class="esm-rtl">שלום</p>"#));
    assert!(out.contains(r#"<p class="esm-ltr">hello</p>"#));
}

#[test]
fn test_html_output_without_detection_is_unclassified() {
    let settings = DirectionSettings {
        auto: false,
        ..DirectionSettings::default()
    };
    let mut model = Model::new(PathBuf::from("t.md"), "שלום", settings);
    let out = render(&mut model, OutputFormat::Html).unwrap();
    assert!(!out.contains("esm-"));
}

#[test]
fn test_output_format_from_flags() {
    assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Plain);
    assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Json);
    assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Html);
}

#[test]
fn test_run_writes_annotations_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "שלום").unwrap();

    let mut out = Vec::new();
    App::new(path).run_with(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "rtl  שלום\n");
}

#[test]
fn test_run_respects_builder_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "hello").unwrap();

    let mut out = Vec::new();
    App::new(path)
        .with_direction(Direction::Rtl)
        .with_format(OutputFormat::Html)
        .run_with(&mut out)
        .unwrap();
    let html = String::from_utf8(out).unwrap();
    assert!(html.contains(r#"class="markdown-preview-view esm-rtl""#));
}
