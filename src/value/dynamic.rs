use serde::{Deserialize, Serialize};

use crate::value::{Color, PointList, Transform2D, ValueKind};

/// A value of any supported kind.
///
/// Operations between different kinds are unresolvable and return `None`. JSON input is
/// matched in declaration order: a number is a scalar, an array of points a point list,
/// anything color-shaped a color, and an object with transform fields a transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain number (opacity, length, angle).
    Scalar(f64),
    /// Point list (polyline vertices).
    Points(PointList),
    /// RGBA color.
    Color(Color),
    /// Composite transform.
    Transform(Transform2D),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<PointList> for Value {
    fn from(v: PointList) -> Self {
        Self::Points(v)
    }
}

impl From<Transform2D> for Value {
    fn from(v: Transform2D) -> Self {
        Self::Transform(v)
    }
}

impl Value {
    /// Kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Points(_) => "points",
            Self::Color(_) => "color",
            Self::Transform(_) => "transform",
        }
    }

    /// Scalar payload, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl ValueKind for Value {
    fn interpolate(&self, to: &Self, fraction: f64) -> Option<Self> {
        match (self, to) {
            (Self::Scalar(a), Self::Scalar(b)) => a.interpolate(b, fraction).map(Self::Scalar),
            (Self::Points(a), Self::Points(b)) => a.interpolate(b, fraction).map(Self::Points),
            (Self::Color(a), Self::Color(b)) => a.interpolate(b, fraction).map(Self::Color),
            (Self::Transform(a), Self::Transform(b)) => {
                a.interpolate(b, fraction).map(Self::Transform)
            }
            _ => None,
        }
    }

    fn add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => ValueKind::add(a, b).map(Self::Scalar),
            (Self::Points(a), Self::Points(b)) => ValueKind::add(a, b).map(Self::Points),
            (Self::Color(a), Self::Color(b)) => ValueKind::add(a, b).map(Self::Color),
            (Self::Transform(a), Self::Transform(b)) => ValueKind::add(a, b).map(Self::Transform),
            _ => None,
        }
    }

    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.equals(b),
            (Self::Points(a), Self::Points(b)) => a.equals(b),
            (Self::Color(a), Self::Color(b)) => a.equals(b),
            (Self::Transform(a), Self::Transform(b)) => a.equals(b),
            _ => false,
        }
    }

    fn serialize(&self) -> String {
        match self {
            Self::Scalar(v) => ValueKind::serialize(v),
            Self::Points(v) => ValueKind::serialize(v),
            Self::Color(v) => ValueKind::serialize(v),
            Self::Transform(v) => ValueKind::serialize(v),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/value/dynamic.rs"]
mod tests;
