use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    let c: Color = serde_json::from_value(json!("#0f0")).unwrap();
    assert_eq!(c, Color::rgb(0.0, 1.0, 0.0));

    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
}

#[test]
fn parses_objects_and_arrays() {
    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgb(0.25, 0.5, 0.75));

    let c: Color = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 0.9));

    let c: Color = serde_json::from_value(json!({"h": 120.0, "s": 1.0, "l": 0.5})).unwrap();
    assert!(c.equals(&Color::rgb(0.0, 1.0, 0.0)));
}

#[test]
fn adapter_ops() {
    let black = Color::rgb(0.0, 0.0, 0.0);
    let white = Color::rgb(1.0, 1.0, 1.0);
    let mid = black.interpolate(&white, 0.5).unwrap();
    assert!(mid.equals(&Color::rgb(0.5, 0.5, 0.5)));

    let sum = Color::rgb(0.75, 0.5, 0.0)
        .add(&Color::rgba(0.5, 0.25, 0.0, 0.5))
        .unwrap();
    assert!(sum.equals(&Color::rgb(1.0, 0.75, 0.0)));

    assert_eq!(ValueKind::serialize(&Color::rgb(1.0, 0.0, 0.0)), "#ff0000");
    assert_eq!(
        ValueKind::serialize(&Color::rgba(0.0, 0.0, 1.0, 0.5)),
        "#0000ff80"
    );
}
