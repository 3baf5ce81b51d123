//! Directory conversion.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use svg2drawable::{BatchConverter, BatchOptions, ConvertError, validate::CRITICAL_BYTE_THRESHOLD};

fn small_icon() -> &'static str {
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M4 4h16v16H4z"/></svg>"#
}

fn oversized_icon() -> String {
    let mut d = String::from("M0 0");
    while d.len() <= CRITICAL_BYTE_THRESHOLD {
        d.push_str(" 1 1");
    }
    format!(r#"<svg viewBox="0 0 24 24"><path id="huge" d="{d}"/></svg>"#)
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_converts_every_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    write(dir.path(), "a.svg", small_icon());
    write(dir.path(), "b.svg", small_icon());
    write(&dir.path().join("sub"), "c.svg", small_icon());

    let summary = BatchConverter::new(BatchOptions::default())
        .convert(dir.path(), &HashSet::new())
        .unwrap();

    assert_eq!(summary.converted, 3);
    assert_eq!(summary.failed, 0);
    for name in ["a", "b", "sub/c"] {
        assert!(dir.path().join(format!("{name}.xml")).exists());
        assert!(!dir.path().join(format!("{name}.svg")).exists());
    }
}

#[test]
fn test_failures_do_not_stop_siblings() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.svg", small_icon());
    write(dir.path(), "bad.svg", "<svg><path d=\"M0 0 L\"/></svg>");
    write(dir.path(), "worse.svg", "not xml at all <");

    let summary = BatchConverter::new(BatchOptions {
        concurrency: 2,
        ..Default::default()
    })
    .convert(dir.path(), &HashSet::new())
    .unwrap();

    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 2);
    assert!(dir.path().join("good.xml").exists());
    assert!(dir.path().join("bad.svg").exists());
}

#[test]
fn test_strict_fails_at_end() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("icon_{i}.svg"), small_icon());
    }
    write(dir.path(), "huge.svg", &oversized_icon());

    let err = BatchConverter::new(BatchOptions {
        strict: true,
        ..Default::default()
    })
    .convert(dir.path(), &HashSet::new())
    .unwrap_err();

    match err {
        ConvertError::PathTooLong { file, issue } => {
            assert_eq!(file, dir.path().join("huge.svg"));
            assert_eq!(issue.path_id, "huge");
            assert!(issue.byte_length > CRITICAL_BYTE_THRESHOLD);
        }
        other => panic!("expected PathTooLong, got {other:?}"),
    }

    // Every file was still converted, the oversized one included
    for i in 0..5 {
        assert!(dir.path().join(format!("icon_{i}.xml")).exists());
    }
    assert!(dir.path().join("huge.xml").exists());
}

#[test]
fn test_non_strict_reports_issues() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ok.svg", small_icon());
    write(dir.path(), "huge.svg", &oversized_icon());

    let summary = BatchConverter::new(BatchOptions::default())
        .convert(dir.path(), &HashSet::new())
        .unwrap();
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.issues.len(), 1);
}

#[test]
fn test_validation_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "huge.svg", &oversized_icon());

    let summary = BatchConverter::new(BatchOptions {
        strict: true,
        validate: false,
        ..Default::default()
    })
    .convert(dir.path(), &HashSet::new())
    .unwrap();
    assert_eq!(summary.converted, 1);
    assert!(summary.issues.is_empty());
}

#[test]
fn test_rtl_names_mirror() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "arrow_back.svg", small_icon());
    write(dir.path(), "home.svg", small_icon());

    let rtl: HashSet<String> = ["arrow_back".to_string()].into();
    BatchConverter::new(BatchOptions::default())
        .convert(dir.path(), &rtl)
        .unwrap();

    let back = fs::read_to_string(dir.path().join("arrow_back.xml")).unwrap();
    let home = fs::read_to_string(dir.path().join("home.xml")).unwrap();
    assert!(back.contains(r#"android:autoMirrored="true""#));
    assert!(!home.contains("autoMirrored"));
}

#[test]
fn test_mirror_all() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "home.svg", small_icon());

    BatchConverter::new(BatchOptions {
        mirror_all: true,
        ..Default::default()
    })
    .convert(dir.path(), &HashSet::new())
    .unwrap();

    let home = fs::read_to_string(dir.path().join("home.xml")).unwrap();
    assert!(home.contains(r#"android:autoMirrored="true""#));
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = BatchConverter::new(BatchOptions::default())
        .convert(&missing, &HashSet::new())
        .unwrap_err();
    assert!(matches!(err, ConvertError::DirectoryNotFound(p) if p == missing));
}
