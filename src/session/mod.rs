//! Request-level entry point: group descriptors by channel, merge each channel and
//! collect diagnostics.

/// Synchronization session and its result.
pub mod sync_session;

pub use sync_session::{SyncOpts, SyncRequest, SyncSession, Synchronization};
