use super::*;

#[test]
fn parses_keywords_and_functions() {
    assert_eq!(Easing::parse("linear").unwrap(), Easing::Linear);
    assert_eq!(Easing::parse(" Ease-In-Out ").unwrap(), Easing::EaseInOut);
    assert_eq!(Easing::parse("step-end").unwrap(), Easing::STEP_END);
    assert_eq!(
        Easing::parse("cubic-bezier(0.1, 0.7, 1.0, 0.1)").unwrap(),
        Easing::CubicBezier {
            x1: 0.1,
            y1: 0.7,
            x2: 1.0,
            y2: 0.1
        }
    );
    assert_eq!(
        Easing::parse("steps(4)").unwrap(),
        Easing::Steps {
            count: 4,
            position: StepPosition::JumpEnd
        }
    );
    assert_eq!(
        Easing::parse("steps(3, start)").unwrap(),
        Easing::Steps {
            count: 3,
            position: StepPosition::JumpStart
        }
    );
    assert_eq!(
        Easing::parse("0 0 0.58 1").unwrap(),
        Easing::CubicBezier {
            x1: 0.0,
            y1: 0.0,
            x2: 0.58,
            y2: 1.0
        }
    );
}

#[test]
fn rejects_invalid_easings() {
    assert!(Easing::parse("bounce").is_err());
    assert!(Easing::parse("cubic-bezier(1.5, 0, 0, 1)").is_err());
    assert!(Easing::parse("cubic-bezier(0, 0, 1)").is_err());
    assert!(Easing::parse("steps(0)").is_err());
    assert!(Easing::parse("steps(1, jump-none)").is_err());
    assert!(Easing::parse("steps(2, sideways)").is_err());
    assert!(matches!(
        Easing::parse("nope").unwrap_err(),
        SyncError::Easing(_)
    ));
}

#[test]
fn display_round_trips_through_parse() {
    for s in [
        "linear",
        "ease",
        "step-start",
        "step-end",
        "steps(5, jump-both)",
        "cubic-bezier(0.1, 0.2, 0.3, 0.4)",
    ] {
        let e = Easing::parse(s).unwrap();
        assert_eq!(e.to_string(), s);
        assert_eq!(Easing::parse(&e.to_string()).unwrap(), e);
    }
}

#[test]
fn bezier_endpoints_and_monotonic_midpoint() {
    for e in [Easing::Ease, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
        assert!(e.apply(0.0).abs() < 1e-9);
        assert!((e.apply(1.0) - 1.0).abs() < 1e-9);
    }
    assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-6);
    assert!(Easing::EaseIn.apply(0.5) < 0.5);
    assert!(Easing::EaseOut.apply(0.5) > 0.5);
}

#[test]
fn reversed_curve_mirrors_progress() {
    for e in [
        Easing::Ease,
        Easing::EaseIn,
        Easing::CubicBezier {
            x1: 0.2,
            y1: 0.9,
            x2: 0.6,
            y2: 0.1,
        },
    ] {
        let r = e.reversed();
        for u in [0.1, 0.3, 0.5, 0.8] {
            let mirrored = 1.0 - e.apply(1.0 - u);
            assert!((r.apply(u) - mirrored).abs() < 1e-6, "{e} at {u}");
        }
    }
    assert_eq!(Easing::STEP_END.reversed(), Easing::STEP_START);
}

#[test]
fn css_step_semantics() {
    let end = Easing::parse("steps(4, jump-end)").unwrap();
    assert_eq!(end.apply(0.0), 0.0);
    assert_eq!(end.apply(0.3), 0.25);
    assert_eq!(end.apply(1.0), 1.0);

    let start = Easing::parse("steps(4, jump-start)").unwrap();
    assert_eq!(start.apply(0.0), 0.25);
    assert_eq!(start.apply(0.8), 1.0);

    let none = Easing::parse("steps(3, jump-none)").unwrap();
    assert_eq!(none.apply(0.0), 0.0);
    assert_eq!(none.apply(0.5), 0.5);
    assert_eq!(none.apply(0.9), 1.0);

    let both = Easing::parse("steps(3, jump-both)").unwrap();
    assert_eq!(both.apply(0.0), 0.25);
    assert_eq!(both.apply(0.99), 0.75);
    assert_eq!(both.apply(1.0), 1.0);
}

#[test]
fn step_keys_expand_jump_end_evenly() {
    let keys = Easing::parse("steps(5, jump-end)").unwrap().step_keys();
    assert_eq!(keys.len(), 5);
    for (i, k) in keys.iter().enumerate() {
        let expect = (i + 1) as f64 / 5.0;
        assert!((k.at - expect).abs() < 1e-12);
        assert!((k.progress - expect).abs() < 1e-12);
        assert!(k.easing.is_hold());
        assert!(!k.snap);
    }
}

#[test]
fn step_keys_for_jump_both_end_with_a_snap() {
    let keys = Easing::parse("steps(2, jump-both)").unwrap().step_keys();
    assert_eq!(keys.len(), 3);
    assert!((keys[0].progress - 1.0 / 3.0).abs() < 1e-12);
    assert!((keys[1].progress - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(keys[1].easing, Easing::STEP_START);
    assert!(keys[2].snap);
    assert_eq!(keys[2].progress, 1.0);
}

#[test]
fn continuous_easing_yields_single_end_key() {
    let keys = Easing::Ease.step_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].at, 1.0);
    assert_eq!(keys[0].easing, Easing::Ease);
}

#[test]
fn serde_uses_text_form() {
    let e: Easing = serde_json::from_str("\"steps(2, end)\"").unwrap();
    assert_eq!(e.to_string(), "steps(2, jump-end)");
    assert_eq!(serde_json::to_string(&Easing::EaseOut).unwrap(), "\"ease-out\"");
}
