use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::foundation::error::{SyncError, SyncResult};

/// Where the jumps of a `steps()` easing happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepPosition {
    /// First jump at the start of the interval.
    JumpStart,
    /// Last jump at the end of the interval.
    JumpEnd,
    /// No jump at either end.
    JumpNone,
    /// Jumps at both ends.
    JumpBoth,
}

impl StepPosition {
    fn keyword(self) -> &'static str {
        match self {
            Self::JumpStart => "jump-start",
            Self::JumpEnd => "jump-end",
            Self::JumpNone => "jump-none",
            Self::JumpBoth => "jump-both",
        }
    }
}

/// Easing function applied to one keyframe segment.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`.
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// CSS cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier {
        /// First control point x, in `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, in `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
    /// Discrete steps.
    Steps {
        /// Number of intervals (at least 1, at least 2 for `jump-none`).
        count: u32,
        /// Jump placement.
        position: StepPosition,
    },
}

/// One sub-key of an expanded segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepKey {
    /// Position inside the segment, in `(0, 1]`.
    pub at: f64,
    /// Eased progress reached at `at`.
    pub progress: f64,
    /// Easing of the pair that ends at this key.
    pub easing: Easing,
    /// Instantaneous jump that must land just after an existing key at the same time.
    pub snap: bool,
}

impl Easing {
    /// Hold the start value for the whole pair, then jump at its end.
    pub const STEP_END: Self = Self::Steps {
        count: 1,
        position: StepPosition::JumpEnd,
    };

    /// Jump to the end value at the start of the pair.
    pub const STEP_START: Self = Self::Steps {
        count: 1,
        position: StepPosition::JumpStart,
    };

    /// Parse an easing from its CSS text form.
    ///
    /// Also accepts four bare numbers (`"x1 y1 x2 y2"`, SVG `keySplines` style) as a cubic
    /// bezier.
    pub fn parse(s: &str) -> SyncResult<Self> {
        let raw = s.trim().to_ascii_lowercase();
        let easing = match raw.as_str() {
            "linear" => Self::Linear,
            "ease" => Self::Ease,
            "ease-in" => Self::EaseIn,
            "ease-out" => Self::EaseOut,
            "ease-in-out" => Self::EaseInOut,
            "step-start" => Self::STEP_START,
            "step-end" => Self::STEP_END,
            other => {
                if let Some(args) = function_args(other, "cubic-bezier") {
                    parse_bezier(&args, s)?
                } else if let Some(args) = function_args(other, "steps") {
                    parse_steps(&args, s)?
                } else {
                    let nums: Vec<&str> = other
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|p| !p.is_empty())
                        .collect();
                    if nums.len() == 4 {
                        parse_bezier(&nums, s)?
                    } else {
                        return Err(SyncError::easing(format!("unknown easing \"{s}\"")));
                    }
                }
            }
        };
        Ok(easing)
    }

    /// Map normalized segment progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier_ease(t, 0.25, 0.1, 0.25, 1.0),
            Self::EaseIn => cubic_bezier_ease(t, 0.42, 0.0, 1.0, 1.0),
            Self::EaseOut => cubic_bezier_ease(t, 0.0, 0.0, 0.58, 1.0),
            Self::EaseInOut => cubic_bezier_ease(t, 0.42, 0.0, 0.58, 1.0),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier_ease(t, x1, y1, x2, y2),
            Self::Steps { count, position } => {
                let n = f64::from(count.max(1));
                let mut step = (t * n).floor();
                if matches!(position, StepPosition::JumpStart | StepPosition::JumpBoth) {
                    step += 1.0;
                }
                let jumps = match position {
                    StepPosition::JumpStart | StepPosition::JumpEnd => n,
                    StepPosition::JumpNone => (n - 1.0).max(1.0),
                    StepPosition::JumpBoth => n + 1.0,
                };
                step.min(jumps) / jumps
            }
        }
    }

    /// The easing that reproduces this curve when the segment is played backwards.
    pub fn reversed(self) -> Self {
        match self {
            Self::Linear | Self::EaseInOut => self,
            Self::EaseIn => Self::EaseOut,
            Self::EaseOut => Self::EaseIn,
            Self::Ease => Self::CubicBezier {
                x1: 0.75,
                y1: 0.0,
                x2: 0.75,
                y2: 0.9,
            },
            Self::CubicBezier { x1, y1, x2, y2 } => Self::CubicBezier {
                x1: 1.0 - x2,
                y1: 1.0 - y2,
                x2: 1.0 - x1,
                y2: 1.0 - y1,
            },
            Self::Steps { count, position } => Self::Steps {
                count,
                position: match position {
                    StepPosition::JumpStart => StepPosition::JumpEnd,
                    StepPosition::JumpEnd => StepPosition::JumpStart,
                    p => p,
                },
            },
        }
    }

    /// Whether this is a discrete easing.
    pub fn is_stepped(self) -> bool {
        matches!(self, Self::Steps { .. })
    }

    /// Whether the pair holds its start value and jumps at its end.
    pub fn is_hold(self) -> bool {
        self == Self::STEP_END
    }

    /// Sub-keys a segment with this easing expands into.
    ///
    /// Continuous easings yield the single end key. `steps(n, ..)` yields one key per jump,
    /// each tagged with a one-step hold so that the expanded chain plays back identically.
    pub fn step_keys(self) -> SmallVec<[StepKey; 8]> {
        let mut out = SmallVec::new();
        let Self::Steps { count, position } = self else {
            out.push(StepKey {
                at: 1.0,
                progress: 1.0,
                easing: self,
                snap: false,
            });
            return out;
        };

        let n = count.max(1);
        let nf = f64::from(n);
        for k in 1..=n {
            let kf = f64::from(k);
            let (progress, easing) = match position {
                StepPosition::JumpEnd => (kf / nf, Self::STEP_END),
                StepPosition::JumpNone => ((kf / (nf - 1.0).max(1.0)).min(1.0), Self::STEP_END),
                StepPosition::JumpStart => (kf / nf, Self::STEP_START),
                StepPosition::JumpBoth => (kf / (nf + 1.0), Self::STEP_START),
            };
            out.push(StepKey {
                at: kf / nf,
                progress,
                easing,
                snap: false,
            });
        }
        if position == StepPosition::JumpBoth {
            out.push(StepKey {
                at: 1.0,
                progress: 1.0,
                easing: Self::STEP_END,
                snap: true,
            });
        }
        out
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            s if s == Self::STEP_START => f.write_str("step-start"),
            s if s == Self::STEP_END => f.write_str("step-end"),
            Self::Steps { count, position } => {
                write!(f, "steps({count}, {})", position.keyword())
            }
        }
    }
}

impl FromStr for Easing {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        Self::parse(s)
    }
}

impl serde::Serialize for Easing {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Easing {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let inner = s
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

fn parse_number(arg: &str, original: &str) -> SyncResult<f64> {
    arg.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SyncError::easing(format!("invalid number \"{arg}\" in \"{original}\"")))
}

fn parse_bezier(args: &[&str], original: &str) -> SyncResult<Easing> {
    let [x1, y1, x2, y2] = args else {
        return Err(SyncError::easing(format!(
            "cubic-bezier needs 4 arguments in \"{original}\""
        )));
    };
    let (x1, y1, x2, y2) = (
        parse_number(x1, original)?,
        parse_number(y1, original)?,
        parse_number(x2, original)?,
        parse_number(y2, original)?,
    );
    if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
        return Err(SyncError::easing(format!(
            "cubic-bezier x values must be in [0, 1] in \"{original}\""
        )));
    }
    Ok(Easing::CubicBezier { x1, y1, x2, y2 })
}

fn parse_steps(args: &[&str], original: &str) -> SyncResult<Easing> {
    let (count, position) = match args {
        [n] => (*n, StepPosition::JumpEnd),
        [n, pos] => {
            let position = match *pos {
                "jump-start" | "start" => StepPosition::JumpStart,
                "jump-end" | "end" => StepPosition::JumpEnd,
                "jump-none" => StepPosition::JumpNone,
                "jump-both" => StepPosition::JumpBoth,
                other => {
                    return Err(SyncError::easing(format!(
                        "unknown step position \"{other}\" in \"{original}\""
                    )));
                }
            };
            (*n, position)
        }
        _ => {
            return Err(SyncError::easing(format!(
                "steps needs 1 or 2 arguments in \"{original}\""
            )));
        }
    };
    let count: u32 = count
        .parse()
        .map_err(|_| SyncError::easing(format!("invalid step count in \"{original}\"")))?;
    let min = if position == StepPosition::JumpNone { 2 } else { 1 };
    if count < min {
        return Err(SyncError::easing(format!(
            "step count must be at least {min} in \"{original}\""
        )));
    }
    Ok(Easing::Steps { count, position })
}

fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    // Solve u such that bx(u) = x, then return by(u).
    fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
    }
    fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    // Newton-Raphson first (fixed iterations, no adaptive loops).
    let mut t = x;
    for _ in 0..8 {
        let x_t = sample_curve(x1, x2, t) - x;
        if x_t.abs() < 1e-9 {
            return sample_curve(y1, y2, t);
        }
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - x_t / d).clamp(0.0, 1.0);
    }

    // Bisection fallback; bx is monotonic for x1, x2 in [0, 1].
    let mut lo = 0.0;
    let mut hi = 1.0;
    t = x;
    for _ in 0..40 {
        let x_t = sample_curve(x1, x2, t);
        if (x_t - x).abs() < 1e-9 {
            break;
        }
        if x_t < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }

    sample_curve(y1, y2, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
