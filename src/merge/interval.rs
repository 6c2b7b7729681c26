use std::collections::HashMap;

use crate::animation::descriptor::{Descriptor, FillMode};
use crate::animation::playback::Playback;
use crate::foundation::core::{GroupId, Priority, TimeUnits};
use crate::foundation::diagnostic::{DiagnosticKind, Diagnostics};
use crate::value::ValueKind;

/// A boundary event of one descriptor on the channel.
///
/// Every descriptor gets a start record; its `end_time` bounds the active interval
/// (`None` when unbounded). Persisting descriptors also get an end record.
#[derive(Clone, Debug)]
pub(crate) struct IntervalRecord<T> {
    pub(crate) time: TimeUnits,
    pub(crate) value: T,
    /// Index into the channel's playbacks.
    pub(crate) source: usize,
    pub(crate) is_start: bool,
    pub(crate) is_end: bool,
    pub(crate) end_time: Option<TimeUnits>,
    pub(crate) fill: FillMode,
    pub(crate) priority: Priority,
}

impl<T> IntervalRecord<T> {
    /// Start record whose descriptor is active at `t`.
    fn active_at(&self, t: TimeUnits) -> bool {
        self.is_start && self.time <= t && self.end_time.is_none_or(|e| t < e)
    }
}

/// Earlier-declared siblings of every descriptor, nearest first.
#[derive(Debug, Default)]
pub(crate) struct GroupChains {
    preceding: Vec<Vec<usize>>,
}

impl GroupChains {
    pub(crate) fn build<T>(descs: &[Descriptor<T>]) -> Self {
        let mut members: HashMap<GroupId, Vec<usize>> = HashMap::new();
        let mut preceding = vec![Vec::new(); descs.len()];
        for (idx, d) in descs.iter().enumerate() {
            let Some(group) = d.group() else {
                continue;
            };
            let siblings = members.entry(group).or_default();
            preceding[idx] = siblings.iter().rev().copied().collect();
            siblings.push(idx);
        }
        Self { preceding }
    }

    pub(crate) fn preceding(&self, idx: usize) -> &[usize] {
        self.preceding.get(idx).map_or(&[], Vec::as_slice)
    }
}

/// Per-channel answer to "what would be visible at T if nothing were playing".
///
/// Built once per merge pass; playbacks are indexed like the descriptor slice.
#[derive(Debug)]
pub(crate) struct IntervalMap<'a, T> {
    plays: Vec<Playback<'a, T>>,
    index: IntervalIndex<T>,
}

/// Sorted boundary records of one channel over its rest value.
///
/// Outlives the playbacks so a finished merge can keep answering `get` and `paused`.
#[derive(Clone, Debug)]
pub(crate) struct IntervalIndex<T> {
    records: Vec<IntervalRecord<T>>,
    rest: T,
}

impl<T: ValueKind> IntervalIndex<T> {
    /// Index of a channel with no descriptors.
    pub(crate) fn empty(rest: T) -> Self {
        Self {
            records: Vec::new(),
            rest,
        }
    }

    /// Value visible at `t` ignoring overlap resolution.
    pub(crate) fn get(&self, t: TimeUnits) -> T {
        let pending = self
            .records
            .iter()
            .filter(|r| r.is_start && r.fill.is_backwards() && r.time > t)
            .min_by(|a, b| a.time.cmp(&b.time).then(b.priority.cmp(&a.priority)));
        if let Some(r) = pending {
            return r.value.clone();
        }
        match visible_fill(&self.records, t, None) {
            Some(r) => r.value.clone(),
            None => self.rest.clone(),
        }
    }

    /// Whether any descriptor is inside its active interval at `t`.
    pub(crate) fn paused(&self, t: TimeUnits) -> bool {
        self.records.iter().any(|r| r.active_at(t))
    }
}

impl<'a, T: ValueKind> IntervalMap<'a, T> {
    /// Resolve every descriptor's underlying value and insert its boundary records.
    ///
    /// Descriptors are visited by delay ascending, later declaration first on ties. An
    /// omitted start resolves from the group chain, then from the fill left by other
    /// descriptors, then from the descriptor's base hint or the channel rest value.
    #[tracing::instrument(level = "debug", skip_all, fields(descriptors = descs.len()))]
    pub(crate) fn build(descs: &'a [Descriptor<T>], rest: T, diags: &mut Diagnostics) -> Self {
        let chains = GroupChains::build(descs);
        let mut order: Vec<usize> = (0..descs.len()).collect();
        order.sort_by(|&a, &b| {
            descs[a]
                .delay()
                .total_cmp(&descs[b].delay())
                .then(descs[b].id().cmp(&descs[a].id()))
        });

        let mut slots: Vec<Option<Playback<'a, T>>> = (0..descs.len()).map(|_| None).collect();
        let mut records: Vec<IntervalRecord<T>> = Vec::new();

        for idx in order {
            let d = &descs[idx];
            let start = d.priority().start;

            let chained = chains.preceding(idx).iter().find_map(|&p| {
                let pb = slots[p].as_ref()?;
                let end = pb.end_units()?;
                (pb.fill().persists() && end <= start).then(|| pb.final_value())
            });
            let (underlying, from_fallback) = match chained {
                Some(v) => (v, false),
                None => match visible_fill(&records, start, Some(idx)) {
                    Some(r) => (r.value.clone(), false),
                    None => (d.base().cloned().unwrap_or_else(|| rest.clone()), true),
                },
            };

            let (pb, snapped) = Playback::new(d, underlying);
            for seg in snapped {
                diags.warn(
                    DiagnosticKind::UnresolvableValue,
                    Some(d.id()),
                    format!("segment {seg} values cannot be interpolated; snapping instead"),
                );
            }

            let end = pb.end_units();
            records.push(IntervalRecord {
                time: start,
                value: pb.start_value(),
                source: idx,
                is_start: true,
                is_end: false,
                end_time: end,
                fill: d.fill(),
                priority: d.priority(),
            });
            if let Some(end) = end
                && d.fill().persists()
            {
                records.push(IntervalRecord {
                    time: end,
                    value: pb.final_value(),
                    source: idx,
                    is_start: false,
                    is_end: true,
                    end_time: Some(end),
                    fill: d.fill(),
                    priority: d.priority(),
                });
            }
            tracing::trace!(descriptor = d.id().0, start, ?end, from_fallback, "interval records inserted");
            slots[idx] = Some(pb);
        }

        records.sort_by(|a, b| a.time.cmp(&b.time).then(a.priority.cmp(&b.priority)));
        Self {
            plays: slots.into_iter().flatten().collect(),
            index: IntervalIndex { records, rest },
        }
    }

    pub(crate) fn get(&self, t: TimeUnits) -> T {
        self.index.get(t)
    }

    pub(crate) fn paused(&self, t: TimeUnits) -> bool {
        self.index.paused(t)
    }

    pub(crate) fn playbacks(&self) -> &[Playback<'a, T>] {
        &self.plays
    }

    /// Drop the playbacks, keeping the records.
    pub(crate) fn into_index(self) -> IntervalIndex<T> {
        self.index
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> &[IntervalRecord<T>] {
        &self.index.records
    }
}

/// Highest-priority persisting end record visible at `t`.
///
/// FREEZE records are always visible. FORWARDS records are hidden once a higher-priority
/// descriptor (other than `exclude`) has started and is still active after them.
fn visible_fill<'r, T>(
    records: &'r [IntervalRecord<T>],
    t: TimeUnits,
    exclude: Option<usize>,
) -> Option<&'r IntervalRecord<T>> {
    records
        .iter()
        .filter(|r| r.is_end && r.time <= t && Some(r.source) != exclude)
        .filter(|r| {
            r.fill.is_freeze()
                || !records.iter().any(|s| {
                    s.is_start
                        && s.source != r.source
                        && Some(s.source) != exclude
                        && s.priority > r.priority
                        && s.time <= t
                        && s.end_time.is_none_or(|e| e > r.time)
                })
        })
        .max_by(|a, b| a.priority.cmp(&b.priority))
}

#[cfg(test)]
#[path = "../../tests/unit/merge/interval.rs"]
mod tests;
