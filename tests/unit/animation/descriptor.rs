use super::*;
use serde_json::json;

fn opacity() -> ChannelKey {
    ChannelKey::new("opacity")
}

fn build(def: DescriptorDef<f64>) -> SyncResult<Descriptor<f64>> {
    Descriptor::from_def(DescriptorId(0), def)
}

#[test]
fn evenly_spaces_missing_key_times_and_defaults_to_linear() {
    let d = build(DescriptorDef::new(opacity(), 900.0, [0.0, 0.5, 1.0])).unwrap();
    assert_eq!(d.key_times(), &[0.0, 0.5, 1.0]);
    assert_eq!(d.easings(), &[Easing::Linear, Easing::Linear]);
    assert_eq!(d.total_duration(), Some(900.0));
}

#[test]
fn lone_value_becomes_to_animation() {
    let d = build(DescriptorDef::new(opacity(), 100.0, [1.0])).unwrap();
    assert!(d.start_omitted());
    assert_eq!(d.key_times(), &[0.0, 1.0]);
    assert_eq!(d.values().len(), 2);
}

#[test]
fn rejects_malformed_descriptors() {
    let bad_len = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0]).key_times([0.0, 0.5, 1.0]);
    assert!(build(bad_len).is_err());

    let descending = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0, 2.0]).key_times([0.0, 0.7, 0.3]);
    assert!(build(descending).is_err());

    let not_zero = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0]).key_times([0.2, 1.0]);
    assert!(build(not_zero).is_err());

    let bad_ease = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0]).easings(["wobble"]);
    assert!(matches!(build(bad_ease).unwrap_err(), SyncError::Easing(_)));

    let wrong_ease_count = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0]).easings(["ease", "ease"]);
    assert!(build(wrong_ease_count).is_err());

    assert!(build(DescriptorDef::new(opacity(), -1.0, [0.0, 1.0])).is_err());
    assert!(build(DescriptorDef::new(opacity(), f64::NAN, [0.0, 1.0])).is_err());
    assert!(
        build(DescriptorDef::new(opacity(), 100.0, [0.0, 1.0]).iterations(IterationCount::Finite(0.0)))
            .is_err()
    );

    let mut hole = DescriptorDef::new(opacity(), 100.0, [0.0, 1.0, 2.0]);
    hole.values[1] = None;
    assert!(build(hole).is_err());
}

#[test]
fn partial_key_times_are_padded_with_holds() {
    let mut def = DescriptorDef::new(opacity(), 100.0, [0.2, 0.8]).key_times([0.25, 0.75]);
    def.partial = true;
    let d = build(def).unwrap();
    assert_eq!(d.key_times(), &[0.0, 0.25, 0.75, 1.0]);
    assert_eq!(d.values()[0], Some(0.2));
    assert_eq!(d.values()[3], Some(0.8));
    assert_eq!(d.easings().len(), 3);
}

#[test]
fn instant_descriptors_become_persisting_setters() {
    let d = build(DescriptorDef::new(opacity(), 0.0, [0.4]).delay(250.0)).unwrap();
    assert!(d.is_setter());
    assert_eq!(d.duration(), ActiveDuration::Instant);
    assert!(d.fill().persists());
    assert_eq!(d.total_duration(), Some(250.0));

    let frozen = build(DescriptorDef::set(opacity(), 10.0, 1.0).fill(FillMode::FREEZE)).unwrap();
    assert!(frozen.fill().is_freeze());
    assert!(!frozen.fill().contains(FillMode::FORWARDS));

    let forever = DescriptorDef::new(opacity(), 0.0, [1.0]).iterations(IterationCount::Infinite);
    assert!(build(forever).is_err());
}

#[test]
fn total_duration_is_unbounded_for_infinite() {
    let d = build(
        DescriptorDef::new(opacity(), 300.0, [0.0, 1.0])
            .delay(-100.0)
            .iterations(IterationCount::Infinite),
    )
    .unwrap();
    assert!(d.is_infinite());
    assert_eq!(d.total_duration(), None);

    let d = build(
        DescriptorDef::new(opacity(), 300.0, [0.0, 1.0])
            .delay(-100.0)
            .iterations(IterationCount::Finite(2.5)),
    )
    .unwrap();
    assert_eq!(d.total_duration(), Some(650.0));
    assert_eq!(d.priority().start, -100);
}

#[test]
fn value_at_applies_accumulate_and_additive() {
    let d = build(DescriptorDef::new(opacity(), 100.0, [1.0, 3.0]).composite(true, true)).unwrap();
    // iteration 2, key 0: 3*2 + 1 on top of underlying 10
    assert_eq!(d.value_at(2, 0, &10.0), Some(17.0));
    assert_eq!(d.value_at(0, 1, &10.0), Some(13.0));

    let plain = build(DescriptorDef::new(opacity(), 100.0, [1.0, 3.0])).unwrap();
    assert_eq!(plain.value_at(5, 1, &10.0), Some(3.0));

    let to = build(DescriptorDef::new(opacity(), 100.0, [5.0])).unwrap();
    assert_eq!(to.value_at(0, 0, &2.0), Some(2.0));
}

#[test]
fn multiply_doubles_correctly() {
    assert_eq!(multiply(&1.5, 0), None);
    assert_eq!(multiply(&1.5, 1), Some(1.5));
    assert_eq!(multiply(&1.5, 7), Some(10.5));
    assert_eq!(multiply(&2.0, 1024), Some(2048.0));
}

#[test]
fn deserializes_from_camel_case_json() {
    let def: DescriptorDef<f64> = serde_json::from_value(json!({
        "channel": "transform:rotate",
        "delay": 100,
        "duration": 400,
        "iterations": "indefinite",
        "keyTimes": [0, 0.5, 1],
        "values": [null, 90, 180],
        "easings": ["ease-in", "steps(2)"],
        "fill": ["backwards", "freeze"],
        "alternate": true,
        "group": 3
    }))
    .unwrap();
    assert_eq!(def.channel, ChannelKey::with_component("transform", "rotate"));
    assert_eq!(def.iterations, IterationCount::Infinite);
    assert!(def.fill.is_backwards() && def.fill.is_freeze());
    assert_eq!(def.group, Some(GroupId(3)));

    let d = build(def).unwrap();
    assert!(d.start_omitted());
    assert_eq!(d.easings()[0], Easing::EaseIn);

    let instant: DescriptorDef<f64> = serde_json::from_value(json!({
        "channel": "opacity",
        "duration": "instant",
        "values": [1],
        "fill": "both"
    }))
    .unwrap();
    assert_eq!(instant.duration, ActiveDuration::Instant);
    assert_eq!(instant.fill, FillMode::BACKWARDS | FillMode::FORWARDS);

    let unknown = serde_json::from_value::<DescriptorDef<f64>>(json!({
        "channel": "opacity",
        "duration": 1,
        "values": [1],
        "speed": 2
    }));
    assert!(unknown.is_err());
}

#[test]
fn base_hint_is_optional_for_any_value_kind() {
    use crate::value::Color;

    let plain: DescriptorDef<Color> = serde_json::from_value(json!({
        "channel": "fill",
        "duration": 200,
        "values": ["#000000", "#ff0000"]
    }))
    .unwrap();
    assert_eq!(plain.base, None);

    let hinted: DescriptorDef<Color> = serde_json::from_value(json!({
        "channel": "fill",
        "duration": 200,
        "values": [null, "#ff0000"],
        "base": "#0000ff"
    }))
    .unwrap();
    assert_eq!(hinted.base, Some(Color::rgb(0.0, 0.0, 1.0)));
}

#[test]
fn fill_mode_serializes_as_flag_list() {
    let f = FillMode::BACKWARDS | FillMode::FREEZE;
    assert_eq!(
        serde_json::to_value(f).unwrap(),
        json!(["backwards", "freeze"])
    );
}
