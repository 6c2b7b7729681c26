use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;
use crate::foundation::math::approx_eq;
use crate::value::{ValueKind, format_number};

/// Ordered list of points (polyline / polygon vertices).
///
/// Two lists only interpolate or add when they have the same number of points.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PointList(pub Vec<Point>);

impl PointList {
    /// Build from `(x, y)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self(pairs.into_iter().map(Point::from).collect())
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no points.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ValueKind for PointList {
    fn interpolate(&self, to: &Self, fraction: f64) -> Option<Self> {
        if self.len() != to.len() {
            return None;
        }
        Some(Self(
            self.0
                .iter()
                .zip(&to.0)
                .map(|(a, b)| a.lerp(*b, fraction))
                .collect(),
        ))
    }

    fn add(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        Some(Self(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| *a + b.to_vec2())
                .collect(),
        ))
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| approx_eq(a.x, b.x) && approx_eq(a.y, b.y))
    }

    fn serialize(&self) -> String {
        self.0
            .iter()
            .map(|p| format!("{},{}", format_number(p.x), format_number(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'de> Deserialize<'de> for PointList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PointRepr {
            Pair([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        let raw = Vec::<PointRepr>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|p| match p {
                    PointRepr::Pair([x, y]) => Point::new(x, y),
                    PointRepr::Obj { x, y } => Point::new(x, y),
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/value/points.rs"]
mod tests;
