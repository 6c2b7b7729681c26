use super::*;

#[test]
fn scalar_adapter_interpolates_and_adds() {
    let (a, b) = (0.0_f64, 10.0_f64);
    assert_eq!(a.interpolate(&b, 0.25), Some(2.5));
    assert_eq!(ValueKind::add(&1.5_f64, &2.0), Some(3.5));
    assert!((0.1_f64 + 0.2).equals(&0.3));
    assert!(!0.0_f64.equals(&0.001));
}

#[test]
fn scalar_serializes_compactly() {
    assert_eq!(ValueKind::serialize(&1.0_f64), "1");
    assert_eq!(ValueKind::serialize(&0.5_f64), "0.5");
    assert_eq!(ValueKind::serialize(&-0.0_f64), "0");
    assert_eq!(ValueKind::serialize(&-12.25_f64), "-12.25");
}
