use std::path::PathBuf;

use super::*;

fn dejavu() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/DejaVuSans.ttf")
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ayo_canvas_fonts_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn register_reads_family_name_from_file() {
    let mut reg = FontRegistry::new();
    assert_eq!(reg.register(dejavu(), "Body").unwrap(), Registration::Added);

    let font = reg.get("body").unwrap();
    assert_eq!(font.name(), "Body");
    assert_eq!(font.family(), "DejaVu Sans");
    assert_eq!(font.path(), dejavu().as_path());
    assert_eq!(reg.len(), 1);
}

#[test]
fn register_same_name_and_path_is_idempotent() {
    let mut reg = FontRegistry::new();
    reg.register(dejavu(), "Body").unwrap();
    assert_eq!(
        reg.register(dejavu(), "BODY").unwrap(),
        Registration::AlreadyPresent
    );
    assert_eq!(reg.len(), 1);
}

#[test]
fn register_same_name_with_other_path_fails() {
    let dir = temp_dir("conflict");
    let copy = dir.join("copy.ttf");
    std::fs::copy(dejavu(), &copy).unwrap();

    let mut reg = FontRegistry::new();
    reg.register(dejavu(), "Body").unwrap();
    let err = reg.register(&copy, "body").unwrap_err();
    assert!(matches!(err, CanvasError::FontRegistration { .. }));
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn register_missing_file_reports_name_and_path() {
    let mut reg = FontRegistry::new();
    let err = reg.register("/no/such/font.ttf", "Ghost").unwrap_err();
    match err {
        CanvasError::FontRegistration { name, path, .. } => {
            assert_eq!(name, "Ghost");
            assert_eq!(path, "/no/such/font.ttf");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(reg.is_empty());
}

#[test]
fn register_rejects_non_font_bytes() {
    let dir = temp_dir("garbage");
    let path = dir.join("garbage.ttf");
    std::fs::write(&path, b"not a font at all").unwrap();

    let mut reg = FontRegistry::new();
    assert!(matches!(
        reg.register(&path, "Garbage"),
        Err(CanvasError::FontRegistration { .. })
    ));
    assert!(reg.is_empty());
}

#[test]
fn resolve_prefers_logical_name_then_file_family_then_first() {
    let mut reg = FontRegistry::new();
    reg.register(dejavu(), "Body").unwrap();

    let by_name = FontSpec::parse("12px body").unwrap();
    assert_eq!(reg.resolve(&by_name).unwrap().name(), "Body");

    let by_family = FontSpec::parse("12px 'DejaVu Sans'").unwrap();
    assert_eq!(reg.resolve(&by_family).unwrap().name(), "Body");

    let fallback = FontSpec::parse("12px Unknown, serif").unwrap();
    assert_eq!(reg.resolve(&fallback).unwrap().name(), "Body");
}

#[test]
fn faces_of_one_family_keep_separate_registrations() {
    let mut reg = FontRegistry::new();
    reg.register(dejavu(), "Body").unwrap();
    reg.register(dejavu().with_file_name("DejaVuSans-Bold.ttf"), "Heavy")
        .unwrap();

    let body = reg.get("Body").unwrap();
    let heavy = reg.get("Heavy").unwrap();
    assert_eq!(body.family(), heavy.family());
    assert_ne!(body.shaping_family(), heavy.shaping_family());

    let resolved = reg.resolve(&FontSpec::parse("12px Heavy").unwrap()).unwrap();
    assert_eq!(resolved.name(), "Heavy");
}

#[test]
fn resolve_without_fonts_is_a_text_error() {
    let reg = FontRegistry::new();
    assert!(matches!(
        reg.resolve(&FontSpec::default()),
        Err(CanvasError::Text(_))
    ));
}
