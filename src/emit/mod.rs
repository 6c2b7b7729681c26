//! Renderer-facing forms of a merged timeline.
//!
//! Both forms drop redundant entries first: an interior entry whose value equals both
//! neighbours never changes what is shown, and neither does one that repeats its
//! predecessor right before a hold. A repeated value ahead of an eased entry stays as the
//! hold before that ramp.

use crate::animation::ease::Easing;
use crate::merge::timeline::TimelineKey;
use crate::value::ValueKind;

/// Normalized-offset keyframe list.
pub mod dense;
/// Consecutive from/to segments.
pub mod pairwise;

pub use dense::{DenseKey, DenseTimeline};
pub use pairwise::{PairwiseTimeline, Segment};

/// Drop interior entries that repeat their predecessor when the next entry either repeats
/// it too or holds up to its own time. First and last entries always stay.
pub(crate) fn collapse<T: ValueKind>(keys: &[TimelineKey<T>]) -> Vec<&TimelineKey<T>> {
    let mut out: Vec<&TimelineKey<T>> = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        let interior = i > 0 && i + 1 < keys.len();
        if interior
            && let Some(prev) = out.last()
            && prev.value.equals(&key.value)
            && (keys[i + 1].value.equals(&key.value) || keys[i + 1].easing == Easing::STEP_END)
        {
            continue;
        }
        out.push(key);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/emit/collapse.rs"]
mod tests;
