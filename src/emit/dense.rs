use serde::ser::SerializeStruct;

use crate::animation::ease::Easing;
use crate::emit::collapse;
use crate::foundation::core::{ChannelKey, TimeUnits};
use crate::merge::timeline::{ChannelTimeline, Repeat};
use crate::value::{AsText, ValueKind};

/// One keyframe at a normalized offset.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseKey<T> {
    /// `time / duration`, in `[0, 1]`.
    pub offset: f64,
    /// Absolute time.
    pub time: TimeUnits,
    /// Value at the keyframe.
    pub value: T,
    /// Easing of the pair ending here.
    pub easing: Easing,
}

impl<T: ValueKind> serde::Serialize for DenseKey<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DenseKey", 4)?;
        s.serialize_field("offset", &self.offset)?;
        s.serialize_field("time", &self.time)?;
        s.serialize_field("value", &AsText(&self.value))?;
        s.serialize_field("easing", &self.easing)?;
        s.end()
    }
}

/// Dense emission: one keyframe list over the whole duration.
#[derive(Clone, Debug)]
pub struct DenseTimeline<T> {
    /// Channel.
    pub channel: ChannelKey,
    /// Total duration in time units.
    pub duration: TimeUnits,
    /// Keyframes with offsets in `[0, 1]`.
    pub keys: Vec<DenseKey<T>>,
    /// Repeat marker of the infinite tail.
    pub repeat: Option<Repeat>,
    /// Value after the end.
    pub rest: T,
}

impl<T: ValueKind> DenseTimeline<T> {
    /// Collapse `timeline` and normalize its times.
    pub fn from_timeline(timeline: &ChannelTimeline<T>) -> Self {
        let duration = timeline.total_duration();
        let keys = collapse(timeline.keys())
            .into_iter()
            .map(|k| DenseKey {
                offset: if duration > 0 {
                    k.time as f64 / duration as f64
                } else {
                    0.0
                },
                time: k.time,
                value: k.value.clone(),
                easing: k.easing,
            })
            .collect();
        Self {
            channel: timeline.channel().clone(),
            duration,
            keys,
            repeat: timeline.repeat(),
            rest: timeline.rest().clone(),
        }
    }
}

impl<T: ValueKind> serde::Serialize for DenseTimeline<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DenseTimeline", 5)?;
        s.serialize_field("channel", &self.channel)?;
        s.serialize_field("duration", &self.duration)?;
        s.serialize_field("keys", &self.keys)?;
        s.serialize_field("repeat", &self.repeat)?;
        s.serialize_field("rest", &AsText(&self.rest))?;
        s.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/emit/dense.rs"]
mod tests;
