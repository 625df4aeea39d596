use serde_json::json;

use super::*;

#[test]
fn gradient_parses_camel_case_json() {
    let g: Gradient = serde_json::from_value(json!({
        "x0": 0, "y0": 0, "x1": 100, "y1": 0,
        "colorStops": [
            {"offset": 0, "color": "#ff0000"},
            {"offset": 1, "color": "blue"}
        ],
        "type": "linear"
    }))
    .unwrap();
    assert_eq!(g.kind, GradientKind::Linear);
    assert_eq!(g.color_stops.len(), 2);
    assert_eq!(g.color_stops[1].color.0, Rgba8::new(0, 0, 255, 255));
    g.validate().unwrap();
}

#[test]
fn kind_defaults_to_linear() {
    let g: Gradient =
        serde_json::from_value(json!({"x0": 0, "y0": 0, "x1": 1, "y1": 1})).unwrap();
    assert_eq!(g.kind, GradientKind::Linear);
}

#[test]
fn validate_rejects_bad_offsets_and_radii() {
    let g = Gradient::linear(0.0, 0.0, 10.0, 0.0).with_stop(1.5, Rgba8::BLACK);
    assert!(g.validate().is_err());

    let g = Gradient::linear(0.0, 0.0, 10.0, 0.0)
        .with_stop(0.8, Rgba8::BLACK)
        .with_stop(0.2, Rgba8::BLACK);
    assert!(g.validate().is_err());

    let mut g = Gradient::radial(5.0, 5.0, 0.0, 5.0, 5.0, 5.0);
    g.validate().unwrap();
    g.r1 = None;
    assert!(g.validate().is_err());
    g.r1 = Some(-1.0);
    assert!(g.validate().is_err());
}

#[test]
fn degenerate_gradients_normalize_to_solid() {
    let empty = FillStyle::Gradient(Gradient::linear(0.0, 0.0, 1.0, 0.0)).normalized();
    assert_eq!(empty, FillStyle::Solid(Rgba8::TRANSPARENT));

    let red = Rgba8::new(255, 0, 0, 255);
    let single =
        FillStyle::Gradient(Gradient::linear(0.0, 0.0, 1.0, 0.0).with_stop(0.5, red)).normalized();
    assert_eq!(single, FillStyle::Solid(red));

    let two = Gradient::linear(0.0, 0.0, 1.0, 0.0)
        .with_stop(0.0, red)
        .with_stop(1.0, Rgba8::BLACK);
    assert_eq!(
        FillStyle::Gradient(two.clone()).normalized(),
        FillStyle::Gradient(two)
    );
}
