use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use crate::animation::ease::Easing;
use crate::animation::playback::{PlayKey, Playback};
use crate::foundation::core::{ChannelKey, Priority, TimeUnits, round_time};
use crate::foundation::diagnostic::{DiagnosticKind, Diagnostics};
use crate::merge::interval::IntervalMap;
use crate::merge::tail;
use crate::merge::timeline::{ChannelTimeline, Repeat, TimelineBuilder};
use crate::session::SyncOpts;
use crate::value::ValueKind;

/// Interrupted or outranked descriptor waiting to resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    priority: Priority,
    idx: usize,
}

/// Sweeps one channel's descriptors in time order and commits the winning value path.
///
/// At any instant exactly one descriptor (the running one) owns the channel. A later
/// start interrupts it; the interrupted descriptor waits in `pending` when its fill
/// persists or it outlives the interrupter, and resumes once the channel frees up.
/// A persisting end raises `floor`, below which pending entries are discarded.
/// An additive run is layered over the highest-priority run still active beneath it.
struct Scheduler<'m, 'a, T> {
    map: &'m IntervalMap<'a, T>,
    plays: Vec<Playback<'a, T>>,
    fresh: VecDeque<usize>,
    setters: BinaryHeap<Reverse<(TimeUnits, Priority, usize)>>,
    pending: BinaryHeap<Pending>,
    cursor: TimeUnits,
    base: T,
    floor: Option<Priority>,
    handoff: Option<T>,
    builder: TimelineBuilder<T>,
    repeat: Option<Repeat>,
    opts: &'m SyncOpts,
    diags: &'m mut Diagnostics,
}

/// Merge every playback of `map` into one gap-free timeline.
#[tracing::instrument(level = "debug", skip_all, fields(channel = %channel))]
pub(crate) fn schedule<T: ValueKind>(
    channel: &ChannelKey,
    map: &IntervalMap<'_, T>,
    opts: &SyncOpts,
    diags: &mut Diagnostics,
) -> ChannelTimeline<T> {
    let plays = map.playbacks().to_vec();

    let mut fresh: Vec<usize> = (0..plays.len())
        .filter(|&i| !plays[i].descriptor().is_setter())
        .collect();
    fresh.sort_by_key(|&i| (plays[i].start_units(), plays[i].priority()));
    let setters = (0..plays.len())
        .filter(|&i| plays[i].descriptor().is_setter())
        .map(|i| Reverse((plays[i].start_units(), plays[i].priority(), i)))
        .collect();

    // Persisting runs that finished before 0 settle the channel up front.
    let settled = plays
        .iter()
        .filter(|pb| {
            !pb.descriptor().is_setter()
                && pb.fill().persists()
                && pb.end_units().is_some_and(|e| e <= 0)
        })
        .max_by_key(|pb| pb.priority())
        .map(|pb| (pb.priority(), pb.final_value()));
    let (floor, initial) = match settled {
        Some((priority, v)) => (Some(priority), v),
        None => (None, map.get(0)),
    };

    let mut s = Scheduler {
        map,
        plays,
        fresh: fresh.into(),
        setters,
        pending: BinaryHeap::new(),
        cursor: 0,
        base: initial.clone(),
        floor,
        handoff: None,
        builder: TimelineBuilder::new(initial),
        repeat: None,
        opts,
        diags,
    };
    s.run();
    s.finish(channel.clone())
}

impl<'m, 'a, T: ValueKind> Scheduler<'m, 'a, T> {
    fn run(&mut self) {
        loop {
            self.fire_due_setters();
            if let Some(idx) = self.select_run() {
                if self.plays[idx].end_units().is_none()
                    && self.fresh.is_empty()
                    && self.setters.is_empty()
                {
                    self.enter_tail(idx);
                    return;
                }
                self.play(idx);
                continue;
            }

            self.handoff = None;
            let Some(next) = self.next_event() else {
                return;
            };
            let v = self.gap_value();
            self.builder.jump(self.cursor, v, None);
            tracing::trace!(from = self.cursor, to = next, "gap");
            self.cursor = next;
        }
    }

    fn below_floor(&self, priority: Priority) -> bool {
        self.floor.is_some_and(|f| priority < f)
    }

    fn raise_floor(&mut self, priority: Priority) {
        self.floor = Some(self.floor.map_or(priority, |f| f.max(priority)));
    }

    /// Value shown while nothing plays: the interval map, unless a dropped descriptor is
    /// still inside its active interval, in which case the last settled value holds.
    fn gap_value(&mut self) -> T {
        if self.map.paused(self.cursor) {
            return self.base.clone();
        }
        let v = self.map.get(self.cursor);
        self.base = v.clone();
        v
    }

    fn next_event(&self) -> Option<TimeUnits> {
        let fresh = self
            .fresh
            .front()
            .map(|&i| self.plays[i].start_units());
        let setter = self.setters.peek().map(|Reverse((t, _, _))| *t);
        match (fresh, setter) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fire_due_setters(&mut self) {
        while let Some(&Reverse((t, priority, idx))) = self.setters.peek()
            && t <= self.cursor
        {
            self.setters.pop();
            if self.below_floor(priority) {
                tracing::debug!(descriptor = self.plays[idx].id().0, "setter superseded");
                continue;
            }
            let v = self.plays[idx].final_value();
            self.builder.jump(self.cursor, v.clone(), Some(self.plays[idx].id()));
            self.base = v;
            self.raise_floor(priority);
            self.handoff = None;
        }
    }

    /// Next descriptor to own the channel: the highest-priority fresh start due at the
    /// cursor, otherwise the highest-priority pending entry still active.
    fn select_run(&mut self) -> Option<usize> {
        let mut ready = Vec::new();
        while let Some(&i) = self.fresh.front()
            && self.plays[i].start_units() <= self.cursor
        {
            self.fresh.pop_front();
            let pb = &self.plays[i];
            if pb.end_units().is_some_and(|e| e <= self.cursor) {
                tracing::trace!(descriptor = pb.id().0, "ended before the cursor reached it");
                continue;
            }
            if self.below_floor(pb.priority()) {
                continue;
            }
            ready.push(i);
        }

        if let Some(&winner) = ready.iter().max_by_key(|&&i| self.plays[i].priority()) {
            let winner_end = self.plays[winner].end_units();
            for &i in &ready {
                if i == winner {
                    continue;
                }
                let pb = &self.plays[i];
                if pb.fill().persists() || outlives(pb.end_units(), winner_end) {
                    self.pending.push(Pending {
                        priority: pb.priority(),
                        idx: i,
                    });
                } else {
                    tracing::debug!(descriptor = pb.id().0, "outranked for its whole interval");
                }
            }
            return Some(winner);
        }

        while let Some(p) = self.pending.pop() {
            let pb = &self.plays[p.idx];
            if pb.end_units().is_some_and(|e| e <= self.cursor) || self.below_floor(p.priority) {
                continue;
            }
            return Some(p.idx);
        }
        None
    }

    /// Apply the handoff or jump to the run's value at the cursor.
    fn enter(&mut self, idx: usize, commit: bool) {
        let start = self.plays[idx].start_units();
        let id = Some(self.plays[idx].id());
        if self.cursor <= start
            && !self.plays[idx].descriptor().additive()
            && let Some(h) = self.handoff.take()
        {
            self.plays[idx].set_start_override(h);
            return;
        }
        self.handoff = None;
        if commit {
            let v = self.plays[idx].sample(self.cursor as f64);
            self.builder.jump(self.cursor, v, id);
        }
    }

    /// Bind an additive run to the value it composes over. Returns the run still active
    /// beneath it, whose value keeps moving while the layer plays.
    fn layer_under(&mut self, idx: usize) -> Option<usize> {
        if !self.plays[idx].descriptor().additive() {
            return None;
        }
        let own = self.plays[idx].priority();
        let cursor = self.cursor;
        let under = (0..self.plays.len())
            .filter(|&i| {
                let pb = &self.plays[i];
                i != idx
                    && !pb.descriptor().is_setter()
                    && pb.priority() < own
                    && !self.below_floor(pb.priority())
                    && pb.start_units() <= cursor
                    && pb.end_units().is_none_or(|e| e > cursor)
            })
            .max_by_key(|&i| self.plays[i].priority());
        let shown = match under {
            Some(u) => self.plays[u].sample(cursor as f64),
            None => self
                .builder
                .last_value()
                .cloned()
                .unwrap_or_else(|| self.base.clone()),
        };
        self.plays[idx].set_underlying(shown);
        under
    }

    /// Value of run `idx` at `t`, summed onto `under` when layered.
    fn layered(&self, idx: usize, under: Option<usize>, t: f64, left: bool) -> T {
        let pb = &self.plays[idx];
        let Some(u) = under else {
            return pb.sample_at(t, left);
        };
        let below = self.plays[u].sample_at(t, left);
        ValueKind::add(&below, &pb.sample_raw(t, left)).unwrap_or_else(|| pb.sample_at(t, left))
    }

    /// Keys of a layered run over `(from, stop]`: the union of both runs' key times.
    fn layered_keys(
        &self,
        idx: usize,
        under: usize,
        from: TimeUnits,
        stop: TimeUnits,
        limit: usize,
    ) -> (Vec<PlayKey<T>>, bool) {
        let mut marks: BTreeMap<TimeUnits, bool> = BTreeMap::new();
        let mut cut = false;
        for i in [idx, under] {
            let (keys, truncated) = self.plays[i].keys(from as f64, stop as f64, limit);
            cut |= truncated;
            for key in keys {
                let t = round_time(key.time);
                if t > from && t <= stop {
                    *marks.entry(t).or_default() |= key.snap;
                }
            }
        }
        marks.entry(stop).or_default();

        let mut out = Vec::with_capacity(marks.len());
        for (t, snap) in marks {
            if out.len() >= limit {
                cut = true;
                break;
            }
            let tf = t as f64;
            out.push(PlayKey {
                time: tf,
                value: self.layered(idx, Some(under), tf, true),
                easing: Easing::Linear,
                snap: false,
            });
            if snap && t < stop {
                out.push(PlayKey {
                    time: tf,
                    value: self.layered(idx, Some(under), tf, false),
                    easing: Easing::STEP_END,
                    snap: true,
                });
            }
        }
        (out, cut)
    }

    /// Highest-priority descriptor starting exactly at `t`, with its end.
    fn interrupter_at(&self, t: TimeUnits) -> Option<(Option<TimeUnits>, bool)> {
        let fresh = self
            .fresh
            .iter()
            .take_while(|&&i| self.plays[i].start_units() == t)
            .map(|&i| &self.plays[i]);
        let setters = self
            .setters
            .iter()
            .filter(|Reverse((st, _, _))| *st == t)
            .map(|Reverse((_, _, i))| &self.plays[*i]);
        fresh
            .chain(setters)
            .max_by_key(|pb| pb.priority())
            .map(|pb| (pb.end_units(), pb.descriptor().start_omitted()))
    }

    fn play(&mut self, idx: usize) {
        let under = self.layer_under(idx);
        self.enter(idx, true);

        let end = self.plays[idx].end_units();
        let interrupt = self
            .next_event()
            .filter(|&t| end.is_none_or(|e| t < e));
        let Some(stop) = interrupt.or(end) else {
            return;
        };

        let remaining = self
            .opts
            .max_keyframes_per_channel
            .saturating_sub(self.builder.len());
        let (keys, cut) = match under {
            Some(u) => self.layered_keys(idx, u, self.cursor, stop, remaining),
            None => self.plays[idx].keys(self.cursor as f64, stop as f64, remaining),
        };
        let fin = match under {
            Some(_) => self.layered(idx, under, stop as f64, true),
            None => self.plays[idx].final_value(),
        };
        let pb = &self.plays[idx];
        let id = Some(pb.id());
        for key in keys {
            let t = round_time(key.time);
            if interrupt.is_some() && t >= stop {
                break;
            }
            if key.snap {
                self.builder.jump(t, key.value, id);
            } else {
                self.builder.commit(t, key.value, key.easing, id);
            }
        }
        if cut {
            if !self.diags.has(DiagnosticKind::KeyframeCap) {
                self.diags.warn(
                    DiagnosticKind::KeyframeCap,
                    id,
                    format!(
                        "keyframe cap of {} reached; collapsing the rest of the run",
                        self.opts.max_keyframes_per_channel
                    ),
                );
            }
            if interrupt.is_none() {
                self.builder.commit(stop, fin.clone(), Easing::STEP_END, id);
            }
        }

        if let Some(t) = interrupt {
            let transitional = self.layered(idx, under, t as f64, false);
            let pb = &self.plays[idx];
            let easing = if cut {
                Easing::STEP_END
            } else if under.is_some() {
                Easing::Linear
            } else {
                pb.segment_easing_at(t as f64)
            };
            self.builder.commit(t, transitional.clone(), easing, id);
            self.cursor = t;

            let persists = pb.fill().persists();
            let (interrupter_end, omits_start) = self.interrupter_at(t).unwrap_or((Some(t), false));
            if persists || outlives(end, interrupter_end) {
                self.pending.push(Pending {
                    priority: pb.priority(),
                    idx,
                });
            }
            if persists || omits_start {
                self.handoff = Some(transitional);
            }
            tracing::trace!(descriptor = pb.id().0, at = t, "interrupted");
            return;
        }

        let pb = &self.plays[idx];
        let priority = pb.priority();
        let persists = pb.fill().persists();
        if self.builder.last_time() < stop {
            self.builder.commit(stop, fin.clone(), Easing::Linear, id);
        }
        self.cursor = stop;
        if persists {
            self.base = fin;
            self.raise_floor(priority);
        }
    }

    fn enter_tail(&mut self, idx: usize) {
        let shown = self
            .builder
            .last_value()
            .cloned()
            .unwrap_or_else(|| self.base.clone());
        let mut contributors = vec![idx];
        while let Some(p) = self.pending.pop() {
            if self.plays[p.idx].end_units().is_none() && !self.below_floor(p.priority) {
                contributors.push(p.idx);
            }
        }
        contributors.sort_by_key(|&i| self.plays[i].priority());
        for &i in &contributors {
            if self.plays[i].descriptor().additive() {
                self.plays[i].set_underlying(shown.clone());
            }
        }
        self.enter(idx, false);
        let repeat = tail::combine(
            &self.plays,
            &contributors,
            self.cursor,
            &mut self.builder,
            self.opts,
            &mut *self.diags,
        );
        self.cursor = repeat.from + repeat.period;
        self.repeat = Some(repeat);
    }

    fn finish(mut self, channel: ChannelKey) -> ChannelTimeline<T> {
        if let Some(r) = self.repeat {
            let total = r.from + r.period;
            let rest = self
                .builder
                .last_value()
                .cloned()
                .unwrap_or_else(|| self.base.clone());
            return self.builder.finish(channel, total, rest, Some(r));
        }

        let last_end = self
            .plays
            .iter()
            .filter_map(Playback::end_units)
            .max()
            .unwrap_or(0);
        let total = last_end.max(self.cursor).max(0);
        if self.cursor < total {
            let v = self.gap_value();
            self.builder.jump(self.cursor, v, None);
        }
        let total = total.max(self.builder.last_time());
        let rest = if self.map.paused(total) {
            self.base.clone()
        } else {
            self.map.get(total)
        };
        self.builder.finish(channel, total, rest, None)
    }
}

/// Whether an interval ending at `a` continues past one ending at `b` (`None` is unbounded).
fn outlives(a: Option<TimeUnits>, b: Option<TimeUnits>) -> bool {
    match (a, b) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a > b,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/merge/scheduler.rs"]
mod tests;
