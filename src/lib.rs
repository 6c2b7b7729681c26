//! wavyte-sync merges independently declared, possibly overlapping animations that
//! target the same property into one deterministic, gap-free timeline per channel.
//!
//! The public API is session-oriented:
//!
//! - Queue [`DescriptorDef`]s (built in code or loaded from JSON) on a [`SyncSession`]
//! - Run it to get an immutable [`Synchronization`]
//! - Read each channel's [`ChannelTimeline`], or its [`DenseTimeline`] / [`PairwiseTimeline`]
//!   emission, plus the [`Diagnostic`]s recorded while merging
//!
//! Values are opaque to the merge core; anything implementing [`ValueKind`] can be
//! synchronized. Scalars, colors, point lists and 2D transforms ship with the crate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod merge;

/// Descriptor model and easing functions.
pub mod animation;
/// Renderer-facing timeline forms.
pub mod emit;
/// Session-oriented synchronization API.
pub mod session;
/// Value kinds and the adapter trait.
pub mod value;

pub use crate::foundation::core::{
    Affine, ChannelKey, DescriptorId, GroupId, Point, Priority, TimeUnits, Vec2, round_time,
};
pub use crate::foundation::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel};
pub use crate::foundation::error::{SyncError, SyncResult};

pub use crate::animation::descriptor::{
    ActiveDuration, Descriptor, DescriptorDef, FillMode, IterationCount,
};
pub use crate::animation::ease::{Easing, StepPosition};
pub use crate::emit::{DenseKey, DenseTimeline, PairwiseTimeline, Segment};
pub use crate::merge::timeline::{ChannelTimeline, Repeat, TimelineKey};
pub use crate::session::{SyncOpts, SyncRequest, SyncSession, Synchronization};
pub use crate::value::{Color, PointList, Transform2D, Value, ValueKind};
