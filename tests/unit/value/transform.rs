use super::*;
use serde_json::json;

#[test]
fn to_affine_identity_and_translation() {
    assert_eq!(Transform2D::default().to_affine(), Affine::IDENTITY);
    assert_eq!(
        Transform2D::translate(10.0, -2.5).to_affine(),
        Affine::translate(Vec2::new(10.0, -2.5))
    );
}

#[test]
fn add_sums_rotation_and_multiplies_scale() {
    let a = Transform2D {
        rotation_rad: 0.5,
        scale: Vec2::new(2.0, 2.0),
        ..Transform2D::default()
    };
    let b = Transform2D {
        rotation_rad: 0.25,
        scale: Vec2::new(1.5, 0.5),
        ..Transform2D::default()
    };
    let sum = ValueKind::add(&a, &b).unwrap();
    assert!(approx_eq(sum.rotation_rad, 0.75));
    assert!(vec_eq(sum.scale, Vec2::new(3.0, 1.0)));
}

#[test]
fn serializes_as_svg_transform_list() {
    assert_eq!(ValueKind::serialize(&Transform2D::default()), "");
    assert_eq!(
        ValueKind::serialize(&Transform2D::translate(5.0, 0.0)),
        "translate(5 0)"
    );
    let t = Transform2D {
        rotation_rad: 90f64.to_radians(),
        anchor: Vec2::new(1.0, 2.0),
        scale: Vec2::new(2.0, 3.0),
        ..Transform2D::default()
    };
    assert_eq!(ValueKind::serialize(&t), "rotate(90 1 2) scale(2 3)");
}

#[test]
fn deserializes_partial_objects_and_rejects_unknown_fields() {
    let t: Transform2D = serde_json::from_value(json!({"rotation_rad": 1.0})).unwrap();
    assert_eq!(t.rotation_rad, 1.0);
    assert_eq!(t.scale, Vec2::new(1.0, 1.0));
    assert!(serde_json::from_value::<Transform2D>(json!({"r": 1.0})).is_err());
}

#[test]
fn interpolation_is_componentwise() {
    let a = Transform2D::rotate_deg(0.0);
    let b = Transform2D::rotate_deg(180.0);
    let mid = a.interpolate(&b, 0.5).unwrap();
    assert!(approx_eq(mid.rotation_rad.to_degrees(), 90.0));
    assert!(Transform2D::scale(2.0, 2.0).equals(&Transform2D::scale(2.0, 2.0)));
}
