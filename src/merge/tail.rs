use std::collections::BTreeMap;

use crate::animation::ease::Easing;
use crate::animation::playback::Playback;
use crate::foundation::core::{TimeUnits, round_time};
use crate::foundation::diagnostic::{DiagnosticKind, Diagnostics};
use crate::foundation::math::lcm_all;
use crate::merge::timeline::{Repeat, TimelineBuilder};
use crate::session::SyncOpts;
use crate::value::ValueKind;

/// What happens at one sample time of the combined period.
#[derive(Clone, Copy, Debug, Default)]
struct Mark {
    /// Easing of the dominant contributor's key landing here.
    easing: Option<Easing>,
    /// Some contributor restarts here.
    snap: bool,
}

/// Commit one period of the infinite tail and return its repeat marker.
///
/// `contributors` are the unbounded descriptors still active at `from`, ascending by
/// priority (the last one is running). The period is the least common multiple of their
/// iteration lengths; alternating contributors count double unless all of them alternate,
/// in which case a single period is generated and mirrored when every contributor is at an
/// iteration boundary. Values fold upward from the highest non-additive contributor, with
/// additive ones above it adding their raw contribution.
#[tracing::instrument(level = "debug", skip_all, fields(from = from, contributors = contributors.len()))]
pub(crate) fn combine<T: ValueKind>(
    plays: &[Playback<'_, T>],
    contributors: &[usize],
    from: TimeUnits,
    builder: &mut TimelineBuilder<T>,
    opts: &SyncOpts,
    diags: &mut Diagnostics,
) -> Repeat {
    let mut set: Vec<&Playback<'_, T>> = contributors.iter().map(|&i| &plays[i]).collect();

    let mut period = tail_period(&set);
    if period.is_none_or(|p| p > opts.max_tail_period)
        && let Some(&top) = set.last()
    {
        diags.info(
            DiagnosticKind::TailPeriodCap,
            Some(top.id()),
            format!(
                "combined tail period exceeds {}; keeping only the running descriptor",
                opts.max_tail_period
            ),
        );
        set = vec![top];
        period = tail_period(&set);
    }
    let period = period.unwrap_or(1).min(i64::MAX as u64) as TimeUnits;

    let dominant = set.iter().rposition(|pb| !pb.descriptor().additive());
    let visible: &[&Playback<'_, T>] = match dominant {
        Some(d) => &set[d..],
        None => &set,
    };
    let exact = visible.len() == 1;

    let all_alternate = set.iter().all(|pb| pb.descriptor().alternate());
    let mirror = all_alternate && set.iter().all(|pb| at_iteration_boundary(pb, from));
    let generated = if all_alternate && !mirror {
        period.saturating_mul(2)
    } else {
        period
    };
    let to = from.saturating_add(generated);

    let mut marks: BTreeMap<TimeUnits, Mark> = BTreeMap::new();
    let budget = opts
        .max_keyframes_per_channel
        .saturating_sub(builder.len());
    let mut cut = false;
    for (pos, pb) in visible.iter().enumerate() {
        let (keys, truncated) = pb.keys(from as f64, to as f64, budget.saturating_sub(marks.len()));
        cut |= truncated;
        for key in keys {
            let t = round_time(key.time);
            if t <= from || t > to {
                continue;
            }
            let mark = marks.entry(t).or_default();
            if key.snap {
                mark.snap = true;
            } else if pos == 0 && dominant.is_some() {
                mark.easing = Some(key.easing);
            }
        }
    }
    marks.entry(to).or_default();
    if cut && !diags.has(DiagnosticKind::KeyframeCap) {
        diags.warn(
            DiagnosticKind::KeyframeCap,
            visible.last().map(|pb| pb.id()),
            format!(
                "keyframe cap of {} reached inside the repeating tail",
                opts.max_keyframes_per_channel
            ),
        );
    }

    let Some((lowest, above)) = visible.split_first() else {
        return Repeat { from, period };
    };
    let fold = |t: TimeUnits, left: bool| -> T {
        let tf = t as f64;
        let raw = lowest.sample_raw(tf, left);
        let mut acc = if lowest.descriptor().additive() {
            ValueKind::add(lowest.underlying(), &raw).unwrap_or(raw)
        } else {
            raw
        };
        for pb in above {
            let raw = pb.sample_raw(tf, left);
            acc = ValueKind::add(&acc, &raw).unwrap_or(acc);
        }
        acc
    };
    let id = visible.last().map(|pb| pb.id());
    let easing_of = |mark: &Mark| {
        if exact {
            mark.easing.unwrap_or(Easing::Linear)
        } else {
            Easing::Linear
        }
    };

    builder.jump(from, fold(from, false), id);
    for (&t, mark) in &marks {
        builder.commit(t, fold(t, true), easing_of(mark), id);
        if mark.snap && t < to {
            builder.jump(t, fold(t, false), id);
        }
    }

    if mirror {
        let generated: Vec<_> = builder
            .keys_from(from)
            .iter()
            .map(|k| (k.time, k.value.clone(), k.easing))
            .collect();
        let pivot = from + period;
        for i in (0..generated.len().saturating_sub(1)).rev() {
            let (t, ref value, _) = generated[i];
            let (_, _, next_easing) = generated[i + 1];
            let easing = if exact {
                next_easing.reversed()
            } else {
                Easing::Linear
            };
            builder.commit(2 * pivot - t, value.clone(), easing, id);
        }
        return Repeat {
            from,
            period: period.saturating_mul(2),
        };
    }

    Repeat {
        from,
        period: generated,
    }
}

/// LCM of the contributors' periods in whole units, `None` on overflow.
fn tail_period<T: ValueKind>(set: &[&Playback<'_, T>]) -> Option<u64> {
    let all_alternate = set.iter().all(|pb| pb.descriptor().alternate());
    lcm_all(set.iter().map(|pb| {
        let span = round_time(pb.descriptor().span()).max(1) as u64;
        if pb.descriptor().alternate() && !all_alternate {
            span.saturating_mul(2)
        } else {
            span
        }
    }))
}

fn at_iteration_boundary<T: ValueKind>(pb: &Playback<'_, T>, t: TimeUnits) -> bool {
    let span = round_time(pb.descriptor().span()).max(1);
    (t - pb.start_units()).rem_euclid(span) == 0
}

#[cfg(test)]
#[path = "../../tests/unit/merge/tail.rs"]
mod tests;
