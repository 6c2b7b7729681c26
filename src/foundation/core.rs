use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{SyncError, SyncResult};

pub use kurbo::{Affine, Point, Vec2};

/// Timeline position in whole time units (milliseconds by convention).
pub type TimeUnits = i64;

/// Round a fractional time to whole units.
///
/// Every committed timeline time passes through here so that long chains of
/// segments never accumulate floating-point drift.
pub fn round_time(t: f64) -> TimeUnits {
    if t.is_nan() {
        return 0;
    }
    // `as` saturates for out-of-range values.
    t.round() as TimeUnits
}

/// One animatable property of one object, optionally narrowed to a sub-component
/// (`transform:rotate` vs `transform:scale`). Channels are merged independently.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelKey {
    /// Animated property name.
    pub property: String,
    /// Sub-component discriminator for composite properties.
    pub component: Option<String>,
}

impl ChannelKey {
    /// Channel for a plain property.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            component: None,
        }
    }

    /// Channel for one sub-component of a composite property.
    pub fn with_component(property: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            component: Some(component.into()),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(c) => write!(f, "{}:{}", self.property, c),
            None => f.write_str(&self.property),
        }
    }
}

impl FromStr for ChannelKey {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        let s = s.trim();
        let (property, component) = match s.split_once(':') {
            Some((p, c)) => (p.trim(), Some(c.trim())),
            None => (s, None),
        };
        if property.is_empty() {
            return Err(SyncError::validation("channel property must be non-empty"));
        }
        if component.is_some_and(str::is_empty) {
            return Err(SyncError::validation(format!(
                "channel \"{s}\" has an empty component"
            )));
        }
        Ok(Self {
            property: property.to_owned(),
            component: component.map(str::to_owned),
        })
    }
}

impl serde::Serialize for ChannelKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ChannelKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Declaration order of a descriptor within one sync request.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct DescriptorId(pub u32);

/// Logical origin shared by sibling descriptors.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct GroupId(pub u32);

/// Merge precedence of one descriptor on its channel.
///
/// Later start wins; at equal start the later declaration wins. Field order makes the
/// derived `Ord` implement exactly that rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority {
    /// Rounded start time.
    pub start: TimeUnits,
    /// Declaration order tie-break.
    pub declared: DescriptorId,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
