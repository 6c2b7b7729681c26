use super::*;
use serde_json::json;

#[test]
fn untagged_json_picks_the_right_kind() {
    let v: Value = serde_json::from_value(json!(0.5)).unwrap();
    assert_eq!(v, Value::Scalar(0.5));

    let v: Value = serde_json::from_value(json!([[0, 0], [1, 1]])).unwrap();
    assert_eq!(v.kind_name(), "points");

    let v: Value = serde_json::from_value(json!("#336699")).unwrap();
    assert_eq!(v.kind_name(), "color");

    let v: Value = serde_json::from_value(json!([0.1, 0.2, 0.3])).unwrap();
    assert_eq!(v.kind_name(), "color");

    let v: Value = serde_json::from_value(json!({"translate": {"x": 1.0, "y": 2.0}})).unwrap();
    assert_eq!(v.kind_name(), "transform");
}

#[test]
fn mixed_kinds_are_unresolvable() {
    let a = Value::Scalar(1.0);
    let b = Value::Color(Color::rgb(1.0, 0.0, 0.0));
    assert!(a.interpolate(&b, 0.5).is_none());
    assert!(ValueKind::add(&a, &b).is_none());
    assert!(!a.equals(&b));
}

#[test]
fn same_kind_delegates_to_adapter() {
    let a = Value::Scalar(2.0);
    let b = Value::Scalar(4.0);
    assert_eq!(a.interpolate(&b, 0.5), Some(Value::Scalar(3.0)));
    assert_eq!(ValueKind::add(&a, &b), Some(Value::Scalar(6.0)));
    assert_eq!(ValueKind::serialize(&b), "4");
    assert_eq!(b.as_scalar(), Some(4.0));
}
