use super::*;
use crate::animation::descriptor::DescriptorDef;
use crate::foundation::core::{ChannelKey, DescriptorId};
use crate::value::PointList;

fn ch() -> ChannelKey {
    ChannelKey::new("opacity")
}

fn descs(defs: Vec<DescriptorDef<f64>>) -> Vec<Descriptor<f64>> {
    defs.into_iter()
        .enumerate()
        .map(|(i, d)| Descriptor::from_def(DescriptorId(i as u32), d).unwrap())
        .collect()
}

fn diags() -> Diagnostics {
    Diagnostics::new(ch())
}

#[test]
fn empty_map_answers_rest() {
    let d: Vec<Descriptor<f64>> = Vec::new();
    let map = IntervalMap::build(&d, 0.25, &mut diags());
    assert_eq!(map.get(0), 0.25);
    assert_eq!(map.get(10_000), 0.25);
    assert!(!map.paused(0));
    assert!(map.records().is_empty());
}

#[test]
fn index_keeps_answering_after_the_descriptors_are_gone() {
    let index = {
        let d = descs(vec![
            DescriptorDef::new(ch(), 100.0, [0.0, 1.0])
                .delay(100.0)
                .fill(FillMode::FORWARDS),
        ]);
        IntervalMap::build(&d, 0.5, &mut diags()).into_index()
    };
    assert_eq!(index.get(50), 0.5);
    assert_eq!(index.get(250), 1.0);
    assert!(index.paused(150));
    assert!(!index.paused(250));

    let empty = IntervalIndex::empty(0.25);
    assert_eq!(empty.get(0), 0.25);
    assert!(!empty.paused(0));
}

#[test]
fn no_fill_leaves_no_end_record() {
    let d = descs(vec![DescriptorDef::new(ch(), 100.0, [0.0, 1.0])]);
    let map = IntervalMap::build(&d, 0.5, &mut diags());
    assert_eq!(map.records().len(), 1);
    assert!(map.records()[0].is_start);
    assert_eq!(map.get(150), 0.5);
}

#[test]
fn freeze_stays_visible_under_later_descriptors() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FREEZE),
        DescriptorDef::new(ch(), 200.0, [5.0, 6.0]).delay(50.0),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(50), 0.0);
    assert_eq!(map.get(100), 1.0);
    assert_eq!(map.get(150), 1.0);
    assert_eq!(map.get(400), 1.0);
}

#[test]
fn forwards_is_superseded_by_a_later_active_descriptor() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FORWARDS),
        DescriptorDef::new(ch(), 200.0, [5.0, 6.0]).delay(50.0),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(150), 0.0);
    assert_eq!(map.get(400), 0.0);
}

#[test]
fn forwards_survives_a_descriptor_that_ended_first() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FORWARDS),
        DescriptorDef::new(ch(), 50.0, [5.0, 6.0]).delay(20.0),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(150), 1.0);
}

#[test]
fn higher_priority_fill_wins() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FREEZE),
        DescriptorDef::new(ch(), 100.0, [0.0, 2.0])
            .delay(200.0)
            .fill(FillMode::FORWARDS),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(250), 1.0);
    assert_eq!(map.get(300), 2.0);
}

#[test]
fn backwards_fill_shows_the_first_value_before_the_start() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [5.0, 6.0])
            .delay(100.0)
            .fill(FillMode::BACKWARDS),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(0), 5.0);
    assert_eq!(map.get(99), 5.0);
    assert_eq!(map.get(250), 0.0);
}

#[test]
fn nearest_pending_backwards_start_wins() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [7.0, 8.0])
            .delay(500.0)
            .fill(FillMode::BACKWARDS),
        DescriptorDef::new(ch(), 100.0, [5.0, 6.0])
            .delay(100.0)
            .fill(FillMode::BACKWARDS),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(map.get(0), 5.0);
    assert_eq!(map.get(300), 7.0);
}

#[test]
fn omitted_start_resolves_from_a_persisting_fill() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FORWARDS),
        DescriptorDef::new(ch(), 100.0, [0.0, 3.0])
            .delay(200.0)
            .from_omitted(),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    let pb = &map.playbacks()[1];
    assert_eq!(*pb.underlying(), 1.0);
    assert_eq!(pb.start_value(), 1.0);
}

#[test]
fn omitted_start_without_fill_falls_back_to_base_or_rest() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 3.0]).from_omitted(),
        DescriptorDef::new(ch(), 100.0, [0.0, 3.0])
            .delay(200.0)
            .from_omitted()
            .base(0.75),
    ]);
    let map = IntervalMap::build(&d, 0.5, &mut diags());
    assert_eq!(*map.playbacks()[0].underlying(), 0.5);
    assert_eq!(map.records()[0].value, 0.5);
    assert_eq!(*map.playbacks()[1].underlying(), 0.75);
}

#[test]
fn group_chain_beats_a_superseded_fill() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 2.0])
            .fill(FillMode::FORWARDS)
            .group(GroupId(1)),
        DescriptorDef::new(ch(), 100.0, [0.0, 5.0])
            .delay(200.0)
            .from_omitted()
            .group(GroupId(1)),
        DescriptorDef::new(ch(), 250.0, [7.0, 8.0])
            .delay(50.0)
            .fill(FillMode::FORWARDS),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert_eq!(*map.playbacks()[1].underlying(), 2.0);
}

#[test]
fn paused_tracks_active_intervals() {
    let d = descs(vec![DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).delay(10.0)]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    assert!(!map.paused(0));
    assert!(map.paused(10));
    assert!(map.paused(109));
    assert!(!map.paused(110));
}

#[test]
fn records_are_sorted_by_time() {
    let d = descs(vec![
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0])
            .delay(300.0)
            .fill(FillMode::FORWARDS),
        DescriptorDef::new(ch(), 100.0, [0.0, 1.0]).fill(FillMode::FORWARDS),
    ]);
    let map = IntervalMap::build(&d, 0.0, &mut diags());
    let times: Vec<TimeUnits> = map.records().iter().map(|r| r.time).collect();
    assert_eq!(times, vec![0, 100, 300, 400]);
}

#[test]
fn unresolvable_segments_are_reported() {
    let d = vec![
        Descriptor::from_def(
            DescriptorId(4),
            DescriptorDef::new(
                ChannelKey::new("points"),
                100.0,
                [
                    PointList::from_pairs([(0.0, 0.0)]),
                    PointList::from_pairs([(1.0, 1.0), (2.0, 2.0)]),
                ],
            ),
        )
        .unwrap(),
    ];
    let mut sink = Diagnostics::new(ChannelKey::new("points"));
    let _map = IntervalMap::build(&d, PointList::default(), &mut sink);
    assert!(sink.has(DiagnosticKind::UnresolvableValue));
    let entries = sink.into_vec();
    assert_eq!(entries[0].descriptor, Some(DescriptorId(4)));
}
