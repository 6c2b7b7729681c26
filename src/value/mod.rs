//! Value kinds the synchronizer can merge.
//!
//! The merge core never looks inside a value: everything it needs goes through
//! [`ValueKind`]. The crate ships adapters for scalars, colors, point lists and
//! composite transforms, plus [`Value`] for callers mixing kinds across channels.

use std::fmt;

use crate::foundation::math::{EPSILON, approx_eq, lerp};

/// Color values.
pub mod color;
/// Mixed-kind dynamic values.
pub mod dynamic;
/// Point-list values.
pub mod points;
/// Composite transform values.
pub mod transform;

/// Adapter for one concrete value kind.
///
/// `interpolate` and `add` return `None` when the two operands cannot be combined
/// (incompatible shapes). The merge core then snaps to the later value instead of
/// interpolating and records a diagnostic.
pub trait ValueKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Value between `self` (at 0) and `to` (at 1).
    fn interpolate(&self, to: &Self, fraction: f64) -> Option<Self>;

    /// `self + other` in the kind's own arithmetic.
    fn add(&self, other: &Self) -> Option<Self>;

    /// Value equality used for duplicate collapsing.
    fn equals(&self, other: &Self) -> bool;

    /// Canonical string form handed to renderers.
    fn serialize(&self) -> String;
}

impl ValueKind for f64 {
    fn interpolate(&self, to: &Self, fraction: f64) -> Option<Self> {
        Some(lerp(*self, *to, fraction))
    }

    fn add(&self, other: &Self) -> Option<Self> {
        Some(self + other)
    }

    fn equals(&self, other: &Self) -> bool {
        approx_eq(*self, *other)
    }

    fn serialize(&self) -> String {
        format_number(*self)
    }
}

/// Shortest decimal form at six-digit precision, with `-0` folded to `0`.
pub(crate) fn format_number(x: f64) -> String {
    let x = (x * 1e6).round() / 1e6;
    if x.abs() < EPSILON {
        return "0".to_owned();
    }
    format!("{x}")
}

/// Serde adapter writing a value through [`ValueKind::serialize`].
pub(crate) struct AsText<'a, T>(pub(crate) &'a T);

impl<T: ValueKind> serde::Serialize for AsText<'_, T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ValueKind::serialize(self.0))
    }
}

pub use color::Color;
pub use dynamic::Value;
pub use points::PointList;
pub use transform::Transform2D;

#[cfg(test)]
#[path = "../../tests/unit/value/scalar.rs"]
mod tests;
