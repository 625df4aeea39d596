use serde_json::json;

use super::*;
use crate::foundation::core::Rgba8;

fn legacy_document() -> serde_json::Value {
    json!({
        "width": 800,
        "height": 300,
        "globalFont": "24px Inter",
        "globalColor": "#ffffff",
        "background": "bg.png",
        "requiredFonts": [{"path": "fonts/Inter.ttf", "fontName": "Inter"}],
        "elements": [
            {
                "avatar": {
                    "x": 10, "y": 10,
                    "image": {"url": "a.png", "width": 50, "height": 50, "isRounded": true}
                },
                "username_text": {
                    "x": 80, "y": 40,
                    "text": {"value": "hello", "color": "red", "maxWidth": 200}
                }
            },
            {
                "kind": "progressBar",
                "x": 80, "y": 60,
                "progressBar": {"width": 200, "height": 12, "color": "#00ff00", "progress": 0.25}
            }
        ]
    })
}

#[test]
fn parses_legacy_keyed_document() {
    let cfg: RenderConfig = serde_json::from_value(legacy_document()).unwrap();
    cfg.validate().unwrap();

    assert_eq!(cfg.width, 800);
    assert_eq!(cfg.global_font.as_ref().unwrap().size_px, 24.0);
    assert_eq!(cfg.global_color.unwrap().0, Rgba8::new(255, 255, 255, 255));
    assert_eq!(cfg.required_fonts[0].font_name, "Inter");

    let elements = cfg.resolved_elements();
    assert_eq!(elements.len(), 3);
    assert!(matches!(&elements[0], Element::Avatar { image, .. } if image.is_rounded));
    assert!(
        matches!(&elements[1], Element::Text { text, .. } if text.value == "hello" && text.max_width == Some(200.0))
    );
    assert!(
        matches!(&elements[2], Element::ProgressBar { progress_bar, .. } if progress_bar.progress == 0.25)
    );
    assert_eq!(elements[0].image_url(), Some("a.png"));
    assert_eq!(elements[1].image_url(), None);
}

#[test]
fn typed_elements_report_field_errors() {
    let err = serde_json::from_value::<RenderConfig>(json!({
        "width": 10, "height": 10,
        "elements": [{"kind": "avatar", "x": 0, "y": 0}]
    }))
    .unwrap_err();
    assert!(err.to_string().contains("image"));

    let err = serde_json::from_value::<RenderConfig>(json!({
        "width": 10, "height": 10,
        "elements": [{"kind": "sparkles", "x": 0, "y": 0}]
    }))
    .unwrap_err();
    assert!(err.to_string().contains("sparkles"));
}

#[test]
fn json_roundtrip_preserves_config() {
    let cfg: RenderConfig = serde_json::from_value(legacy_document()).unwrap();
    let text = cfg.to_json_pretty().unwrap();
    let again = RenderConfig::from_json_str(&text).unwrap();
    assert_eq!(cfg, again);
}

#[test]
fn validate_rejects_bad_dimensions() {
    assert!(RenderConfig::new(0, 10).validate().is_err());
    assert!(RenderConfig::new(10, 0).validate().is_err());
    assert!(RenderConfig::new(70_000, 10).validate().is_err());
    RenderConfig::new(1, 1).validate().unwrap();
}

#[test]
fn validate_rejects_bad_references_and_elements() {
    let mut cfg = RenderConfig::new(10, 10);
    cfg.background = Some("  ".to_string());
    assert!(cfg.validate().is_err());

    let mut cfg = RenderConfig::new(10, 10);
    cfg.required_fonts.push(RequiredFont {
        path: String::new(),
        font_name: "X".to_string(),
    });
    assert!(cfg.validate().is_err());

    let mut cfg = RenderConfig::new(10, 10);
    cfg.elements.push(
        Element::Avatar {
            x: f64::NAN,
            y: 0.0,
            image: ImageSpec {
                url: "a.png".to_string(),
                width: 5.0,
                height: 5.0,
                is_rounded: false,
            },
        }
        .into(),
    );
    assert!(cfg.validate().is_err());

    let mut cfg = RenderConfig::new(10, 10);
    cfg.elements.push(
        Element::ProgressBar {
            x: 0.0,
            y: 0.0,
            progress_bar: ProgressBarSpec {
                width: 10.0,
                height: 2.0,
                color: CssColor(Rgba8::BLACK),
                stroke: None,
                is_round: false,
                gradient: None,
                progress: 1.5,
                track_color: None,
            },
        }
        .into(),
    );
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_resolved_checks_the_given_elements() {
    let cfg: RenderConfig = serde_json::from_value(legacy_document()).unwrap();
    let mut elements = cfg.resolved_elements();
    cfg.validate_resolved(&elements).unwrap();

    if let Element::Avatar { image, .. } = &mut elements[0] {
        image.width = -1.0;
    }
    assert!(matches!(
        cfg.validate_resolved(&elements),
        Err(CanvasError::Validation(_))
    ));

    let bad = RenderConfig::new(0, 10);
    assert!(bad.validate_resolved(&[]).is_err());
}

#[test]
fn text_stroke_width_defaults_to_one() {
    let spec: TextSpec = serde_json::from_value(json!({"value": "x", "stroke": "black"})).unwrap();
    assert_eq!(spec.stroke_width, 1.0);
    assert_eq!(spec.stroke.unwrap().0, Rgba8::BLACK);
}
