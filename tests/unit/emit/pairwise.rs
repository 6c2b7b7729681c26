use super::*;
use crate::merge::timeline::TimelineBuilder;

fn ch() -> ChannelKey {
    ChannelKey::new("opacity")
}

fn spans(p: &PairwiseTimeline<f64>) -> Vec<(i64, i64, f64, f64)> {
    p.segments
        .iter()
        .map(|s| (s.delay, s.duration, s.from, s.to))
        .collect()
}

#[test]
fn eased_pairs_become_segments() {
    let mut b = TimelineBuilder::new(0.0);
    b.commit(500, 0.5, Easing::Linear, None);
    b.jump(500, 1.0, None);
    b.commit(1000, 0.0, Easing::EaseOut, None);
    let p = PairwiseTimeline::from_timeline(&b.finish(ch(), 1000, 0.0, None));
    assert_eq!(
        spans(&p),
        vec![
            (0, 500, 0.0, 0.5),
            (501, 0, 0.5, 1.0),
            (501, 499, 1.0, 0.0),
        ]
    );
    assert_eq!(p.segments[2].easing, Easing::EaseOut);
}

#[test]
fn holds_are_skipped_and_padded() {
    let mut b = TimelineBuilder::new(2.0);
    b.jump(300, 5.0, None);
    let p = PairwiseTimeline::from_timeline(&b.finish(ch(), 800, 5.0, None));
    assert_eq!(
        spans(&p),
        vec![(0, 0, 2.0, 2.0), (300, 0, 2.0, 5.0), (800, 0, 5.0, 5.0)]
    );
}

#[test]
fn step_start_jumps_at_the_segment_start() {
    let mut b = TimelineBuilder::new(0.0);
    b.commit(100, 1.0, Easing::STEP_START, None);
    let p = PairwiseTimeline::from_timeline(&b.finish(ch(), 100, 1.0, None));
    assert_eq!(spans(&p), vec![(0, 0, 0.0, 1.0), (100, 0, 1.0, 1.0)]);
}

#[test]
fn single_point_is_one_instant_segment() {
    let p = PairwiseTimeline::from_timeline(&ChannelTimeline::constant(ch(), 0.5));
    assert_eq!(spans(&p), vec![(0, 0, 0.5, 0.5)]);
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["segments"][0]["from"], "0.5");
}
