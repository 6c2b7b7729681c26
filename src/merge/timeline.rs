use serde::ser::SerializeStruct;

use crate::animation::ease::Easing;
use crate::foundation::core::{ChannelKey, DescriptorId, TimeUnits};
use crate::value::{AsText, ValueKind};

/// One committed `(time, value)` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineKey<T> {
    /// Non-negative time in whole units.
    pub time: TimeUnits,
    /// Channel value at `time`.
    pub value: T,
    /// Easing of the pair ending at this entry.
    pub easing: Easing,
    /// Descriptor that contributed the value, if any.
    pub source: Option<DescriptorId>,
}

impl<T: ValueKind> serde::Serialize for TimelineKey<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TimelineKey", 4)?;
        s.serialize_field("time", &self.time)?;
        s.serialize_field("value", &AsText(&self.value))?;
        s.serialize_field("easing", &self.easing)?;
        s.serialize_field("source", &self.source)?;
        s.end()
    }
}

/// Marker for a timeline whose tail repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Repeat {
    /// Start of the repeating segment.
    pub from: TimeUnits,
    /// Length of one repetition.
    pub period: TimeUnits,
}

/// Merged, gap-free value sequence of one channel.
#[derive(Clone, Debug)]
pub struct ChannelTimeline<T> {
    channel: ChannelKey,
    keys: Vec<TimelineKey<T>>,
    rest: T,
    repeat: Option<Repeat>,
}

impl<T: ValueKind> ChannelTimeline<T> {
    /// Timeline consisting of the single point `(0, value)`.
    pub fn constant(channel: ChannelKey, value: T) -> Self {
        Self {
            channel,
            keys: vec![TimelineKey {
                time: 0,
                value: value.clone(),
                easing: Easing::Linear,
                source: None,
            }],
            rest: value,
            repeat: None,
        }
    }

    /// Channel this timeline belongs to.
    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }

    /// Entries with strictly increasing times, starting at 0.
    pub fn keys(&self) -> &[TimelineKey<T>] {
        &self.keys
    }

    /// Value after the last entry (ignored when the timeline repeats).
    pub fn rest(&self) -> &T {
        &self.rest
    }

    /// Repeat marker of the infinite tail.
    pub fn repeat(&self) -> Option<Repeat> {
        self.repeat
    }

    /// Time of the last entry.
    pub fn total_duration(&self) -> TimeUnits {
        self.keys.last().map_or(0, |k| k.time)
    }

    /// Value at any time, honoring the repeat marker.
    pub fn sample(&self, t: f64) -> T {
        let mut t = t;
        if let Some(r) = self.repeat
            && r.period > 0
        {
            let from = r.from as f64;
            let period = r.period as f64;
            if t > from + period {
                t = from + (t - from).rem_euclid(period);
            }
        }

        let Some(first) = self.keys.first() else {
            return self.rest.clone();
        };
        if t <= first.time as f64 {
            return first.value.clone();
        }
        let i = self.keys.partition_point(|k| (k.time as f64) <= t);
        if i >= self.keys.len() {
            let last = &self.keys[self.keys.len() - 1];
            return if self.repeat.is_some() || t <= last.time as f64 {
                last.value.clone()
            } else {
                self.rest.clone()
            };
        }
        let a = &self.keys[i - 1];
        let b = &self.keys[i];
        if t == a.time as f64 {
            return a.value.clone();
        }
        let f = (t - a.time as f64) / (b.time - a.time) as f64;
        let p = b.easing.apply(f);
        if p >= 1.0 {
            return b.value.clone();
        }
        a.value
            .interpolate(&b.value, p)
            .unwrap_or_else(|| a.value.clone())
    }
}

impl<T: ValueKind> serde::Serialize for ChannelTimeline<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ChannelTimeline", 5)?;
        s.serialize_field("channel", &self.channel)?;
        s.serialize_field("duration", &self.total_duration())?;
        s.serialize_field("keys", &self.keys)?;
        s.serialize_field("rest", &AsText(&self.rest))?;
        s.serialize_field("repeat", &self.repeat)?;
        s.end()
    }
}

/// Accumulates committed entries for one channel, enforcing strictly increasing times.
#[derive(Debug)]
pub(crate) struct TimelineBuilder<T> {
    keys: Vec<TimelineKey<T>>,
    provisional: bool,
}

impl<T: ValueKind> TimelineBuilder<T> {
    /// Start from a provisional entry at 0 that the first real commit at 0 replaces.
    pub(crate) fn new(initial: T) -> Self {
        Self {
            keys: vec![TimelineKey {
                time: 0,
                value: initial,
                easing: Easing::Linear,
                source: None,
            }],
            provisional: true,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn last_time(&self) -> TimeUnits {
        self.keys.last().map_or(0, |k| k.time)
    }

    pub(crate) fn last_value(&self) -> Option<&T> {
        self.keys.last().map(|k| &k.value)
    }

    fn push(&mut self, time: TimeUnits, value: T, easing: Easing, source: Option<DescriptorId>) {
        tracing::trace!(time, %easing, "commit");
        self.provisional = false;
        self.keys.push(TimelineKey {
            time,
            value,
            easing,
            source,
        });
    }

    /// Keyframe on an eased path. A commit at the last entry's time replaces it; earlier
    /// or negative times are dropped.
    pub(crate) fn commit(
        &mut self,
        time: TimeUnits,
        value: T,
        easing: Easing,
        source: Option<DescriptorId>,
    ) {
        if time < 0 {
            return;
        }
        match self.keys.last_mut() {
            Some(last) if time < last.time => {
                tracing::trace!(time, last = last.time, "dropping out-of-order commit");
            }
            Some(last) if time == last.time => {
                last.value = value;
                last.easing = easing;
                last.source = source;
                self.provisional = false;
            }
            _ => self.push(time, value, easing, source),
        }
    }

    /// Instantaneous change to `value` at `time`.
    ///
    /// The previous value holds until `time`. When `time` already carries a different
    /// value, the change lands one unit later.
    pub(crate) fn jump(&mut self, time: TimeUnits, value: T, source: Option<DescriptorId>) {
        let time = time.max(0);
        let Some(last) = self.keys.last_mut() else {
            self.push(time, value, Easing::Linear, source);
            return;
        };
        if self.provisional && time <= last.time {
            last.value = value;
            last.source = source;
            self.provisional = false;
            return;
        }
        let time = time.max(last.time);
        if time > last.time {
            self.push(time, value, Easing::STEP_END, source);
        } else if !last.value.equals(&value) {
            self.push(time + 1, value, Easing::STEP_END, source);
        }
    }

    /// Entries at or after `from`.
    pub(crate) fn keys_from(&self, from: TimeUnits) -> &[TimelineKey<T>] {
        let i = self.keys.partition_point(|k| k.time < from);
        &self.keys[i..]
    }

    /// Close the timeline with a hold out to `total`.
    pub(crate) fn finish(
        mut self,
        channel: ChannelKey,
        total: TimeUnits,
        rest: T,
        repeat: Option<Repeat>,
    ) -> ChannelTimeline<T> {
        if let Some(last) = self.keys.last()
            && last.time < total
        {
            let value = last.value.clone();
            self.push(total, value, Easing::Linear, None);
        }
        ChannelTimeline {
            channel,
            keys: self.keys,
            rest,
            repeat,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/merge/timeline.rs"]
mod tests;
