/// Convenience result type used across the synchronizer.
pub type SyncResult<T> = Result<T, SyncError>;

/// Top-level error taxonomy used by synchronizer APIs.
///
/// Merging itself never fails: malformed input is dropped and reported as a
/// [`crate::Diagnostic`]. Errors surface from validation helpers and session setup.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// Invalid caller-provided descriptor or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Easing specification that could not be parsed.
    #[error("easing error: {0}")]
    Easing(String),

    /// Errors while setting up or running a merge pass.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Build a [`SyncError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SyncError::Easing`] value.
    pub fn easing(msg: impl Into<String>) -> Self {
        Self::Easing(msg.into())
    }

    /// Build a [`SyncError::Schedule`] value.
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`SyncError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
