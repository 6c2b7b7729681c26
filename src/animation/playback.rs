use crate::animation::descriptor::{Descriptor, FillMode};
use crate::animation::ease::Easing;
use crate::foundation::core::{DescriptorId, Priority, TimeUnits, round_time};
use crate::value::ValueKind;

const FRACTION_EPS: f64 = 1e-9;

/// One absolute keyframe produced by expanding a descriptor's playback.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlayKey<T> {
    pub(crate) time: f64,
    pub(crate) value: T,
    /// Easing of the pair that ends at this key.
    pub(crate) easing: Easing,
    /// Instantaneous change at a time that already carries a key.
    pub(crate) snap: bool,
}

/// A descriptor bound to its resolved underlying value: everything needed to sample it
/// at any absolute time or enumerate its keyframes.
#[derive(Clone, Debug)]
pub(crate) struct Playback<'a, T> {
    desc: &'a Descriptor<T>,
    underlying: T,
    start_override: Option<T>,
    easings: Vec<Easing>,
}

impl<'a, T: ValueKind> Playback<'a, T> {
    /// Bind `desc` to `underlying`. Segments whose endpoints cannot be interpolated are
    /// switched to a hold; their indices are returned.
    pub(crate) fn new(desc: &'a Descriptor<T>, underlying: T) -> (Self, Vec<usize>) {
        let mut pb = Self {
            desc,
            underlying,
            start_override: None,
            easings: desc.easings().to_vec(),
        };
        let mut snapped = Vec::new();
        for i in 0..pb.easings.len() {
            let a = pb.value(0, i);
            let b = pb.value(0, i + 1);
            if a.interpolate(&b, 0.5).is_none() {
                pb.easings[i] = Easing::STEP_END;
                snapped.push(i);
            }
        }
        (pb, snapped)
    }

    pub(crate) fn descriptor(&self) -> &'a Descriptor<T> {
        self.desc
    }

    pub(crate) fn id(&self) -> DescriptorId {
        self.desc.id()
    }

    pub(crate) fn priority(&self) -> Priority {
        self.desc.priority()
    }

    pub(crate) fn fill(&self) -> FillMode {
        self.desc.fill()
    }

    pub(crate) fn underlying(&self) -> &T {
        &self.underlying
    }

    /// Rebind the value additive keys are composed over.
    pub(crate) fn set_underlying(&mut self, value: T) {
        self.underlying = value;
    }

    /// Replace the first played value of the first iteration.
    pub(crate) fn set_start_override(&mut self, value: T) {
        self.start_override = Some(value);
    }

    pub(crate) fn start(&self) -> f64 {
        self.desc.delay()
    }

    pub(crate) fn end(&self) -> Option<f64> {
        self.desc.total_duration()
    }

    pub(crate) fn start_units(&self) -> TimeUnits {
        round_time(self.start())
    }

    pub(crate) fn end_units(&self) -> Option<TimeUnits> {
        self.end().map(round_time)
    }

    fn span(&self) -> f64 {
        self.desc.span()
    }

    fn count(&self) -> Option<f64> {
        match self.desc.iterations() {
            crate::animation::descriptor::IterationCount::Finite(c) => Some(c),
            crate::animation::descriptor::IterationCount::Infinite => None,
        }
    }

    fn last_iteration(&self) -> Option<u64> {
        self.count().map(|c| (c.ceil() as u64).max(1) - 1)
    }

    /// Fraction of the last iteration that plays, in `(0, 1]`.
    fn end_fraction(&self) -> f64 {
        match (self.count(), self.last_iteration()) {
            (Some(c), Some(k)) => (c - k as f64).clamp(FRACTION_EPS, 1.0),
            _ => 1.0,
        }
    }

    pub(crate) fn reversed_iteration(&self, iteration: u64) -> bool {
        self.desc.reverse() ^ (self.desc.alternate() && iteration % 2 == 1)
    }

    fn first_played_index(&self) -> usize {
        if self.reversed_iteration(0) {
            self.desc.values().len() - 1
        } else {
            0
        }
    }

    fn compose(&self, iteration: u64, index: usize, additive: bool) -> T {
        if iteration == 0
            && index == self.first_played_index()
            && let Some(v) = &self.start_override
        {
            return v.clone();
        }
        self.desc
            .compose(iteration, index, &self.underlying, additive)
            .or_else(|| self.desc.values().get(index).cloned().flatten())
            .unwrap_or_else(|| self.underlying.clone())
    }

    /// Key value with additive/accumulate applied.
    pub(crate) fn value(&self, iteration: u64, index: usize) -> T {
        self.compose(iteration, index, self.desc.additive())
    }

    fn mix(a: &T, b: &T, progress: f64) -> T {
        if progress >= 1.0 {
            return b.clone();
        }
        if progress <= 0.0 {
            return a.clone();
        }
        a.interpolate(b, progress).unwrap_or_else(|| a.clone())
    }

    /// Segment index containing forward position `q`.
    fn segment_at(&self, q: f64) -> usize {
        let kt = self.desc.key_times();
        let last_seg = kt.len().saturating_sub(2);
        let idx = kt.partition_point(|&k| k <= q).saturating_sub(1);
        idx.min(last_seg)
    }

    fn position_value(&self, iteration: u64, q: f64, additive: bool) -> T {
        let kt = self.desc.key_times();
        if kt.len() < 2 {
            return self.compose(iteration, 0, additive);
        }
        let i = self.segment_at(q);
        let w = kt[i + 1] - kt[i];
        let f = if w <= FRACTION_EPS {
            1.0
        } else {
            ((q - kt[i]) / w).clamp(0.0, 1.0)
        };
        let a = self.compose(iteration, i, additive);
        let b = self.compose(iteration, i + 1, additive);
        Self::mix(&a, &b, self.easings[i].apply(f))
    }

    /// Value at play fraction `p` of `iteration`.
    fn play_value(&self, iteration: u64, p: f64, additive: bool) -> T {
        let q = if self.reversed_iteration(iteration) {
            1.0 - p
        } else {
            p
        };
        self.position_value(iteration, q, additive)
    }

    /// Iteration and play fraction at absolute time `t`. At an iteration boundary `left`
    /// picks the end of the previous iteration instead of the start of the next.
    pub(crate) fn locate(&self, t: f64, left: bool) -> (u64, f64) {
        let span = self.span();
        let local = t - self.start();
        if span <= 0.0 {
            return (0, 1.0);
        }
        if local <= 0.0 {
            return (0, 0.0);
        }
        if let (Some(c), Some(k)) = (self.count(), self.last_iteration())
            && local >= span * c - FRACTION_EPS
        {
            return (k, self.end_fraction());
        }
        let x = local / span;
        let k = x.floor();
        let p = x - k;
        let k = k as u64;
        if left && p < FRACTION_EPS && k >= 1 {
            return (k - 1, 1.0);
        }
        (k, p)
    }

    /// Value at absolute time `t`, clamped to the active interval.
    pub(crate) fn sample(&self, t: f64) -> T {
        self.sample_at(t, false)
    }

    /// Like [`Self::sample`], but `left` picks the end of the previous iteration at a
    /// boundary.
    pub(crate) fn sample_at(&self, t: f64, left: bool) -> T {
        let (k, p) = self.locate(t, left);
        self.play_value(k, p, self.desc.additive())
    }

    /// Own contribution at `t`, without adding onto the underlying value.
    pub(crate) fn sample_raw(&self, t: f64, left: bool) -> T {
        let (k, p) = self.locate(t, left);
        self.play_value(k, p, false)
    }

    /// First value shown when playback begins.
    pub(crate) fn start_value(&self) -> T {
        self.play_value(0, 0.0, self.desc.additive())
    }

    /// Value left at the end of the active interval.
    pub(crate) fn final_value(&self) -> T {
        if self.desc.is_setter() {
            return self.value(0, self.desc.values().len() - 1);
        }
        let k = self.last_iteration().unwrap_or(0);
        self.play_value(k, self.end_fraction(), self.desc.additive())
    }

    /// Easing tag for a key placed at `t` that cuts the running segment short.
    pub(crate) fn segment_easing_at(&self, t: f64) -> Easing {
        let kt = self.desc.key_times();
        if kt.len() < 2 {
            return Easing::Linear;
        }
        let (k, p) = self.locate(t, true);
        let reversed = self.reversed_iteration(k);
        let q = if reversed { 1.0 - p } else { p };
        let e = self.easings[self.segment_at(q)];
        if e.is_stepped() {
            Easing::STEP_END
        } else if reversed {
            e.reversed()
        } else {
            e
        }
    }

    /// Keys of one iteration in play order, as `(play fraction, key)`.
    fn iteration_keys(&self, iteration: u64) -> Vec<(f64, PlayKey<T>)> {
        let kt = self.desc.key_times();
        let n = kt.len();
        let mut out = Vec::new();
        if n < 2 {
            let v = self.value(iteration, 0);
            out.push((
                1.0,
                PlayKey {
                    time: 0.0,
                    value: v,
                    easing: Easing::Linear,
                    snap: false,
                },
            ));
            return out;
        }

        let reversed = self.reversed_iteration(iteration);
        let segments: Vec<usize> = if reversed {
            (0..n - 1).rev().collect()
        } else {
            (0..n - 1).collect()
        };
        for i in segments {
            let w = kt[i + 1] - kt[i];
            let (a, b, easing, origin) = if reversed {
                (
                    self.value(iteration, i + 1),
                    self.value(iteration, i),
                    self.easings[i].reversed(),
                    1.0 - kt[i + 1],
                )
            } else {
                (
                    self.value(iteration, i),
                    self.value(iteration, i + 1),
                    self.easings[i],
                    kt[i],
                )
            };
            for sk in easing.step_keys() {
                let value = Self::mix(&a, &b, sk.progress);
                out.push((
                    origin + sk.at * w,
                    PlayKey {
                        time: 0.0,
                        value,
                        easing: sk.easing,
                        snap: sk.snap || w <= FRACTION_EPS,
                    },
                ));
            }
        }
        out
    }

    /// Keys with absolute time in `(from, to]`, at most `limit` of them. The flag reports
    /// whether the limit cut the enumeration short.
    pub(crate) fn keys(&self, from: f64, to: f64, limit: usize) -> (Vec<PlayKey<T>>, bool) {
        let span = self.span();
        let start = self.start();
        let mut out = Vec::new();
        if span <= 0.0 || to <= from || to <= start {
            return (out, false);
        }

        let k_lo = ((from - start) / span).floor().max(0.0) as u64;
        let k_hi_time = ((to - start) / span).floor().max(0.0) as u64;
        let k_hi = match self.last_iteration() {
            Some(last) => last.min(k_hi_time),
            None => k_hi_time,
        };
        let inside = |t: f64| t > from && t <= to;

        for k in k_lo..=k_hi {
            let s_k = start + k as f64 * span;
            let limit_frac = if Some(k) == self.last_iteration() {
                self.end_fraction()
            } else {
                1.0
            };

            if k > 0 && inside(s_k) {
                out.push(PlayKey {
                    time: s_k,
                    value: self.play_value(k, 0.0, self.desc.additive()),
                    easing: Easing::STEP_END,
                    snap: true,
                });
            }

            let mut last_frac = 0.0;
            for (frac, mut key) in self.iteration_keys(k) {
                if frac > limit_frac + FRACTION_EPS {
                    break;
                }
                last_frac = frac;
                key.time = s_k + frac * span;
                if inside(key.time) {
                    out.push(key);
                }
            }

            if limit_frac < 1.0 && last_frac < limit_frac - FRACTION_EPS {
                let time = s_k + limit_frac * span;
                if inside(time) {
                    out.push(PlayKey {
                        time,
                        value: self.play_value(k, limit_frac, self.desc.additive()),
                        easing: self.segment_easing_at(time),
                        snap: false,
                    });
                }
            }

            if out.len() >= limit {
                out.truncate(limit);
                return (out, true);
            }
        }
        (out, false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/playback.rs"]
mod tests;
