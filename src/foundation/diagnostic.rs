use std::fmt;

use crate::foundation::core::{ChannelKey, DescriptorId};

/// Severity of a merge diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Expected degradation (empty channel, collapsed tail).
    Info,
    /// Caller input was dropped or altered.
    Warn,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Warn => f.write_str("WARN"),
        }
    }
}

/// What went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Descriptor failed validation and was excluded.
    MalformedDescriptor,
    /// Two adjacent values could not be interpolated; the segment snaps instead.
    UnresolvableValue,
    /// Every descriptor on the channel was dropped (or none was declared).
    EmptyChannel,
    /// The per-channel keyframe cap was reached.
    KeyframeCap,
    /// The combined infinite-tail period overflowed or exceeded the configured maximum.
    TailPeriodCap,
}

/// One quality issue found while merging a channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Channel the issue belongs to.
    pub channel: ChannelKey,
    /// Offending descriptor, when one can be named.
    pub descriptor: Option<DescriptorId>,
    /// Category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Warn-level diagnostic.
    pub fn warn(channel: ChannelKey, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            channel,
            descriptor: None,
            kind,
            message: message.into(),
        }
    }

    /// Info-level diagnostic.
    pub fn info(channel: ChannelKey, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            channel,
            descriptor: None,
            kind,
            message: message.into(),
        }
    }

    /// Attach the offending descriptor.
    pub fn with_descriptor(mut self, id: DescriptorId) -> Self {
        self.descriptor = Some(id);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.channel)?;
        if let Some(id) = self.descriptor {
            write!(f, "#{}", id.0)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Per-channel diagnostic sink. Every recorded entry is also logged.
#[derive(Debug)]
pub(crate) struct Diagnostics {
    channel: ChannelKey,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new(channel: ChannelKey) -> Self {
        Self {
            channel,
            entries: Vec::new(),
        }
    }

    pub(crate) fn warn(
        &mut self,
        kind: DiagnosticKind,
        descriptor: Option<DescriptorId>,
        message: impl Into<String>,
    ) {
        let mut d = Diagnostic::warn(self.channel.clone(), kind, message);
        d.descriptor = descriptor;
        tracing::warn!(channel = %self.channel, ?kind, descriptor = ?descriptor, "{}", d.message);
        self.entries.push(d);
    }

    pub(crate) fn info(
        &mut self,
        kind: DiagnosticKind,
        descriptor: Option<DescriptorId>,
        message: impl Into<String>,
    ) {
        let mut d = Diagnostic::info(self.channel.clone(), kind, message);
        d.descriptor = descriptor;
        tracing::debug!(channel = %self.channel, ?kind, descriptor = ?descriptor, "{}", d.message);
        self.entries.push(d);
    }

    pub(crate) fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostic.rs"]
mod tests;
