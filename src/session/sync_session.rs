use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::de::DeserializeOwned;

use crate::animation::descriptor::{Descriptor, DescriptorDef};
use crate::emit::{DenseTimeline, PairwiseTimeline};
use crate::foundation::core::{ChannelKey, DescriptorId, TimeUnits};
use crate::foundation::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::foundation::error::{SyncError, SyncResult};
use crate::merge::interval::IntervalIndex;
use crate::merge::merge_channel;
use crate::merge::timeline::ChannelTimeline;
use crate::value::ValueKind;

/// Options controlling a synchronization pass.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOpts {
    /// Merge channels in parallel (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Longest combined infinite-tail period, in time units, before falling back to the
    /// running descriptor alone.
    pub max_tail_period: u64,
    /// Maximum committed entries per channel before the remainder of a run collapses.
    pub max_keyframes_per_channel: usize,
}

impl Default for SyncOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            max_tail_period: 3_600_000,
            max_keyframes_per_channel: 100_000,
        }
    }
}

/// JSON request shape accepted by [`SyncSession::extend_json`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncRequest<T> {
    /// Per-channel rest values.
    #[serde(default = "BTreeMap::new")]
    pub rest: BTreeMap<ChannelKey, T>,
    /// Descriptors in declaration order.
    pub descriptors: Vec<DescriptorDef<T>>,
}

/// Collects descriptors for one synchronization request.
///
/// Descriptors are numbered in push order; that number is the tie-break between two
/// descriptors starting at the same time. Nothing is validated until [`SyncSession::run`].
#[derive(Clone, Debug)]
pub struct SyncSession<T> {
    opts: SyncOpts,
    defs: Vec<(DescriptorId, DescriptorDef<T>)>,
    rest: BTreeMap<ChannelKey, T>,
}

impl<T: ValueKind> SyncSession<T> {
    /// Empty session.
    pub fn new(opts: SyncOpts) -> Self {
        Self {
            opts,
            defs: Vec::new(),
            rest: BTreeMap::new(),
        }
    }

    /// Options this session runs with.
    pub fn opts(&self) -> &SyncOpts {
        &self.opts
    }

    /// Set the value `channel` shows when nothing animates it.
    pub fn set_rest(&mut self, channel: ChannelKey, value: T) {
        self.rest.insert(channel, value);
    }

    /// Queue a descriptor and return its declaration id.
    ///
    /// Fails once the session holds as many descriptors as there are ids.
    pub fn push(&mut self, def: DescriptorDef<T>) -> SyncResult<DescriptorId> {
        let id = next_id(self.defs.len())?;
        self.defs.push((id, def));
        Ok(id)
    }

    /// Number of queued descriptors.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no descriptor was queued.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Merge every channel.
    ///
    /// Malformed descriptors are dropped and reported in
    /// [`Synchronization::diagnostics`]; only invalid options fail the call.
    #[tracing::instrument(level = "debug", skip_all, fields(descriptors = self.defs.len(), parallel = self.opts.parallel))]
    pub fn run(&self) -> SyncResult<Synchronization<T>> {
        validate_opts(&self.opts)?;
        let jobs = self.channel_jobs();
        tracing::debug!(channels = jobs.len(), "synchronizing");

        let done: Vec<ChannelOutcome<T>> = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                jobs.into_par_iter()
                    .map(|job| job.run(&self.opts))
                    .collect()
            })
        } else {
            jobs.into_iter().map(|job| job.run(&self.opts)).collect()
        };

        let mut channels = BTreeMap::new();
        let mut diagnostics = Vec::new();
        for outcome in done {
            diagnostics.extend(outcome.diagnostics);
            if let Some(state) = outcome.state {
                channels.insert(outcome.channel, state);
            }
        }
        Ok(Synchronization {
            channels,
            diagnostics,
        })
    }

    /// Group descriptors by channel, validating each one.
    fn channel_jobs(&self) -> Vec<ChannelJob<T>> {
        let mut by_channel: BTreeMap<ChannelKey, Vec<(DescriptorId, &DescriptorDef<T>)>> =
            BTreeMap::new();
        for (id, def) in &self.defs {
            by_channel
                .entry(def.channel.clone())
                .or_default()
                .push((*id, def));
        }
        for channel in self.rest.keys() {
            by_channel.entry(channel.clone()).or_default();
        }

        by_channel
            .into_iter()
            .map(|(channel, defs)| {
                let mut diags = Diagnostics::new(channel.clone());
                let rest = self
                    .rest
                    .get(&channel)
                    .cloned()
                    .or_else(|| defs.iter().find_map(|(_, d)| d.base.clone()))
                    .or_else(|| {
                        defs.iter()
                            .flat_map(|(_, d)| d.values.iter())
                            .find_map(Clone::clone)
                    });
                let mut descriptors = Vec::with_capacity(defs.len());
                for (id, def) in defs {
                    match Descriptor::from_def(id, def.clone()) {
                        Ok(d) => descriptors.push(d),
                        Err(e) => diags.warn(
                            DiagnosticKind::MalformedDescriptor,
                            Some(id),
                            e.to_string(),
                        ),
                    }
                }
                ChannelJob {
                    channel,
                    descriptors,
                    rest,
                    diags,
                }
            })
            .collect()
    }
}

impl<T: ValueKind + DeserializeOwned> SyncSession<T> {
    /// Queue descriptors from JSON: either a bare descriptor array or a
    /// `{ "rest": {...}, "descriptors": [...] }` request object.
    pub fn extend_json(&mut self, json: &str) -> SyncResult<Vec<DescriptorId>> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            List(Vec<DescriptorDef<T>>),
            Request(SyncRequest<T>),
        }

        let repr: Repr<T> =
            serde_json::from_str(json).map_err(|e| SyncError::serde(e.to_string()))?;
        let defs = match repr {
            Repr::List(defs) => defs,
            Repr::Request(req) => {
                self.rest.extend(req.rest);
                req.descriptors
            }
        };
        defs.into_iter().map(|d| self.push(d)).collect()
    }
}

/// One channel's validated input.
struct ChannelJob<T> {
    channel: ChannelKey,
    descriptors: Vec<Descriptor<T>>,
    rest: Option<T>,
    diags: Diagnostics,
}

struct ChannelOutcome<T> {
    channel: ChannelKey,
    state: Option<ChannelState<T>>,
    diagnostics: Vec<Diagnostic>,
}

impl<T: ValueKind> ChannelJob<T> {
    fn run(self, opts: &SyncOpts) -> ChannelOutcome<T> {
        let ChannelJob {
            channel,
            descriptors,
            rest,
            mut diags,
        } = self;
        let Some(rest) = rest else {
            diags.warn(
                DiagnosticKind::EmptyChannel,
                None,
                "no rest value and no concrete descriptor value; channel omitted",
            );
            return ChannelOutcome {
                channel,
                state: None,
                diagnostics: diags.into_vec(),
            };
        };
        let (timeline, intervals) = merge_channel(&channel, &descriptors, rest, opts, &mut diags);
        ChannelOutcome {
            channel,
            state: Some(ChannelState {
                timeline,
                intervals,
            }),
            diagnostics: diags.into_vec(),
        }
    }
}

#[derive(Debug)]
struct ChannelState<T> {
    timeline: ChannelTimeline<T>,
    intervals: IntervalIndex<T>,
}

/// Immutable result of [`SyncSession::run`].
#[derive(Debug)]
pub struct Synchronization<T> {
    channels: BTreeMap<ChannelKey, ChannelState<T>>,
    diagnostics: Vec<Diagnostic>,
}

impl<T: ValueKind> Synchronization<T> {
    /// Merged channels, in key order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelKey> {
        self.channels.keys()
    }

    /// Every diagnostic, grouped by channel in key order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Merged timeline of `channel`.
    pub fn timeline(&self, channel: &ChannelKey) -> Option<&ChannelTimeline<T>> {
        self.channels.get(channel).map(|s| &s.timeline)
    }

    /// Every merged timeline, in key order.
    pub fn timelines(&self) -> impl Iterator<Item = &ChannelTimeline<T>> {
        self.channels.values().map(|s| &s.timeline)
    }

    /// Value the merged timeline shows at `t`.
    pub fn sample(&self, channel: &ChannelKey, t: f64) -> Option<T> {
        self.timeline(channel).map(|tl| tl.sample(t))
    }

    /// Value visible at `t` ignoring overlap resolution.
    pub fn get(&self, channel: &ChannelKey, t: TimeUnits) -> Option<T> {
        self.channels.get(channel).map(|s| s.intervals.get(t))
    }

    /// Whether any descriptor of `channel` is active at `t`.
    pub fn paused(&self, channel: &ChannelKey, t: TimeUnits) -> Option<bool> {
        self.channels.get(channel).map(|s| s.intervals.paused(t))
    }

    /// Dense emission of `channel`.
    pub fn dense(&self, channel: &ChannelKey) -> Option<DenseTimeline<T>> {
        self.timeline(channel).map(DenseTimeline::from_timeline)
    }

    /// Pairwise emission of `channel`.
    pub fn pairwise(&self, channel: &ChannelKey) -> Option<PairwiseTimeline<T>> {
        self.timeline(channel).map(PairwiseTimeline::from_timeline)
    }
}

impl<T: ValueKind> serde::Serialize for Synchronization<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let timelines: Vec<&ChannelTimeline<T>> = self.timelines().collect();
        let mut s = serializer.serialize_struct("Synchronization", 2)?;
        s.serialize_field("timelines", &timelines)?;
        s.serialize_field("diagnostics", &self.diagnostics)?;
        s.end()
    }
}

fn next_id(len: usize) -> SyncResult<DescriptorId> {
    u32::try_from(len).map(DescriptorId).map_err(|_| {
        SyncError::validation(format!(
            "a session holds at most {} descriptors",
            u64::from(u32::MAX) + 1
        ))
    })
}

fn validate_opts(opts: &SyncOpts) -> SyncResult<()> {
    if let Some(n) = opts.threads
        && n == 0
    {
        return Err(SyncError::validation("sync 'threads' must be >= 1 when set"));
    }
    if opts.max_keyframes_per_channel < 2 {
        return Err(SyncError::validation(
            "sync 'max_keyframes_per_channel' must be >= 2",
        ));
    }
    if opts.max_tail_period == 0 {
        return Err(SyncError::validation("sync 'max_tail_period' must be >= 1"));
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> SyncResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SyncError::schedule(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/sync_session.rs"]
mod tests;
