use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Vec2};
use crate::foundation::math::{approx_eq, lerp};
use crate::value::{ValueKind, format_number};

/// Decomposed 2D transform: translate, rotate about `anchor`, scale.
///
/// Addition follows SVG additive transform semantics per component: translations and
/// rotations sum, scales multiply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transform2D {
    /// Translation.
    pub translate: Vec2,
    /// Rotation in radians.
    pub rotation_rad: f64,
    /// Non-uniform scale, `(1, 1)` is identity.
    pub scale: Vec2,
    /// Rotation/scale pivot in local space.
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Pure translation.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Pure rotation (degrees) about the origin.
    pub fn rotate_deg(deg: f64) -> Self {
        Self {
            rotation_rad: deg.to_radians(),
            ..Self::default()
        }
    }

    /// Pure scale.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            scale: Vec2::new(sx, sy),
            ..Self::default()
        }
    }

    /// Compose into an affine matrix.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_anchor = Affine::translate(self.anchor);
        let t_unanchor = Affine::translate(-self.anchor);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);

        // T(translate) * T(anchor) * R(rot) * S(scale) * T(-anchor)
        t_translate * t_anchor * t_rotate * t_scale * t_unanchor
    }
}

fn vec_eq(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

impl ValueKind for Transform2D {
    fn interpolate(&self, to: &Self, fraction: f64) -> Option<Self> {
        Some(Self {
            translate: self.translate.lerp(to.translate, fraction),
            rotation_rad: lerp(self.rotation_rad, to.rotation_rad, fraction),
            scale: self.scale.lerp(to.scale, fraction),
            anchor: self.anchor.lerp(to.anchor, fraction),
        })
    }

    fn add(&self, other: &Self) -> Option<Self> {
        Some(Self {
            translate: self.translate + other.translate,
            rotation_rad: self.rotation_rad + other.rotation_rad,
            scale: Vec2::new(self.scale.x * other.scale.x, self.scale.y * other.scale.y),
            anchor: self.anchor + other.anchor,
        })
    }

    fn equals(&self, other: &Self) -> bool {
        vec_eq(self.translate, other.translate)
            && approx_eq(self.rotation_rad, other.rotation_rad)
            && vec_eq(self.scale, other.scale)
            && vec_eq(self.anchor, other.anchor)
    }

    /// SVG transform list. Identity components are omitted; the identity itself is
    /// the empty string.
    fn serialize(&self) -> String {
        let mut parts = Vec::new();
        if !vec_eq(self.translate, Vec2::ZERO) {
            parts.push(format!(
                "translate({} {})",
                format_number(self.translate.x),
                format_number(self.translate.y)
            ));
        }
        if !approx_eq(self.rotation_rad, 0.0) {
            let deg = format_number(self.rotation_rad.to_degrees());
            if vec_eq(self.anchor, Vec2::ZERO) {
                parts.push(format!("rotate({deg})"));
            } else {
                parts.push(format!(
                    "rotate({deg} {} {})",
                    format_number(self.anchor.x),
                    format_number(self.anchor.y)
                ));
            }
        }
        if !vec_eq(self.scale, Vec2::new(1.0, 1.0)) {
            parts.push(format!(
                "scale({} {})",
                format_number(self.scale.x),
                format_number(self.scale.y)
            ));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/value/transform.rs"]
mod tests;
