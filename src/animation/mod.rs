//! Descriptor model: validated animation declarations and their playback expansion.

/// Descriptor boundary types and validation.
pub mod descriptor;
/// Easing functions.
pub mod ease;
pub(crate) mod playback;
