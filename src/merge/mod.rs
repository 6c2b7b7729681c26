//! Per-channel merge.
//!
//! A channel's descriptors are first indexed into an [`interval::IntervalMap`] (what each
//! descriptor leaves visible once it is no longer playing), then swept in time order by
//! the scheduler, which commits the winning value path into a [`timeline::ChannelTimeline`].
//! Unbounded descriptors end the sweep in a repeating tail.

use crate::animation::descriptor::Descriptor;
use crate::foundation::core::ChannelKey;
use crate::foundation::diagnostic::{DiagnosticKind, Diagnostics};
use crate::session::SyncOpts;
use crate::value::ValueKind;

pub(crate) mod interval;
pub(crate) mod scheduler;
pub(crate) mod tail;
/// Merged timeline types.
pub mod timeline;

use interval::IntervalIndex;
use timeline::ChannelTimeline;

/// Merge one channel's validated descriptors over `rest`.
///
/// Returns the timeline with the interval index it was scheduled against.
pub(crate) fn merge_channel<T: ValueKind>(
    channel: &ChannelKey,
    descs: &[Descriptor<T>],
    rest: T,
    opts: &SyncOpts,
    diags: &mut Diagnostics,
) -> (ChannelTimeline<T>, IntervalIndex<T>) {
    if descs.is_empty() {
        diags.info(
            DiagnosticKind::EmptyChannel,
            None,
            "no usable descriptors; channel holds its rest value",
        );
        return (
            ChannelTimeline::constant(channel.clone(), rest.clone()),
            IntervalIndex::empty(rest),
        );
    }
    let map = interval::IntervalMap::build(descs, rest, diags);
    let timeline = scheduler::schedule(channel, &map, opts, diags);
    (timeline, map.into_index())
}
