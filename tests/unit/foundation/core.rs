use super::*;

#[test]
fn round_time_rounds_half_away_and_handles_nan() {
    assert_eq!(round_time(499.5), 500);
    assert_eq!(round_time(-0.4), 0);
    assert_eq!(round_time(-250.6), -251);
    assert_eq!(round_time(f64::NAN), 0);
    assert_eq!(round_time(f64::INFINITY), i64::MAX);
}

#[test]
fn channel_key_parses_and_displays_components() {
    let k: ChannelKey = "transform:rotate".parse().unwrap();
    assert_eq!(k, ChannelKey::with_component("transform", "rotate"));
    assert_eq!(k.to_string(), "transform:rotate");

    let k: ChannelKey = " opacity ".parse().unwrap();
    assert_eq!(k, ChannelKey::new("opacity"));
    assert_eq!(k.to_string(), "opacity");

    assert!("".parse::<ChannelKey>().is_err());
    assert!("transform:".parse::<ChannelKey>().is_err());
}

#[test]
fn channel_key_serde_uses_string_form() {
    let k = ChannelKey::with_component("transform", "scale");
    let s = serde_json::to_string(&k).unwrap();
    assert_eq!(s, "\"transform:scale\"");
    let back: ChannelKey = serde_json::from_str(&s).unwrap();
    assert_eq!(back, k);
}

#[test]
fn priority_prefers_later_start_then_later_declaration() {
    let early_late_decl = Priority {
        start: 0,
        declared: DescriptorId(9),
    };
    let late_early_decl = Priority {
        start: 10,
        declared: DescriptorId(0),
    };
    assert!(late_early_decl > early_late_decl);

    let a = Priority {
        start: 5,
        declared: DescriptorId(1),
    };
    let b = Priority {
        start: 5,
        declared: DescriptorId(2),
    };
    assert!(b > a);
}
