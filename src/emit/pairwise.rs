use serde::ser::SerializeStruct;

use crate::animation::ease::{Easing, StepPosition};
use crate::emit::collapse;
use crate::foundation::core::{ChannelKey, TimeUnits};
use crate::merge::timeline::{ChannelTimeline, Repeat};
use crate::value::{AsText, ValueKind};

/// One from/to transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<T> {
    /// Absolute start time.
    pub delay: TimeUnits,
    /// Length; zero for instantaneous changes.
    pub duration: TimeUnits,
    /// Value at the start.
    pub from: T,
    /// Value at the end.
    pub to: T,
    /// Easing across the segment.
    pub easing: Easing,
}

impl<T: ValueKind> serde::Serialize for Segment<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Segment", 5)?;
        s.serialize_field("delay", &self.delay)?;
        s.serialize_field("duration", &self.duration)?;
        s.serialize_field("from", &AsText(&self.from))?;
        s.serialize_field("to", &AsText(&self.to))?;
        s.serialize_field("easing", &self.easing)?;
        s.end()
    }
}

/// Pairwise emission for renderers that only animate between two values.
#[derive(Clone, Debug)]
pub struct PairwiseTimeline<T> {
    /// Channel.
    pub channel: ChannelKey,
    /// Total duration in time units.
    pub duration: TimeUnits,
    /// Segments ordered by start time.
    pub segments: Vec<Segment<T>>,
    /// Repeat marker of the infinite tail.
    pub repeat: Option<Repeat>,
    /// Value after the end.
    pub rest: T,
}

impl<T: ValueKind> PairwiseTimeline<T> {
    /// Split `timeline` into segments.
    ///
    /// Holds between equal values are skipped. Single-step easings become zero-length
    /// segments at the jump. The first segment always starts at 0 and the last one always
    /// ends at the total duration, padded with zero-length segments where needed.
    pub fn from_timeline(timeline: &ChannelTimeline<T>) -> Self {
        let duration = timeline.total_duration();
        let keys = collapse(timeline.keys());
        let mut segments: Vec<Segment<T>> = Vec::new();

        for pair in keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.value.equals(&b.value) {
                continue;
            }
            let segment = match b.easing {
                Easing::Steps {
                    count: 1,
                    position: StepPosition::JumpEnd,
                } => instant(b.time, &a.value, &b.value),
                Easing::Steps {
                    count: 1,
                    position: StepPosition::JumpStart,
                } => instant(a.time, &a.value, &b.value),
                easing => Segment {
                    delay: a.time,
                    duration: b.time - a.time,
                    from: a.value.clone(),
                    to: b.value.clone(),
                    easing,
                },
            };
            segments.push(segment);
        }

        if let Some(first) = keys.first()
            && segments.first().is_none_or(|s| s.delay > 0)
        {
            segments.insert(0, instant(0, &first.value, &first.value));
        }
        if let Some(last) = keys.last()
            && segments
                .last()
                .is_none_or(|s| s.delay + s.duration < duration)
        {
            segments.push(instant(duration, &last.value, &last.value));
        }

        Self {
            channel: timeline.channel().clone(),
            duration,
            segments,
            repeat: timeline.repeat(),
            rest: timeline.rest().clone(),
        }
    }
}

fn instant<T: ValueKind>(at: TimeUnits, from: &T, to: &T) -> Segment<T> {
    Segment {
        delay: at,
        duration: 0,
        from: from.clone(),
        to: to.clone(),
        easing: Easing::Linear,
    }
}

impl<T: ValueKind> serde::Serialize for PairwiseTimeline<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PairwiseTimeline", 5)?;
        s.serialize_field("channel", &self.channel)?;
        s.serialize_field("duration", &self.duration)?;
        s.serialize_field("segments", &self.segments)?;
        s.serialize_field("repeat", &self.repeat)?;
        s.serialize_field("rest", &AsText(&self.rest))?;
        s.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/emit/pairwise.rs"]
mod tests;
