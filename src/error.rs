// SPDX-License-Identifier: MIT
//! Engine error taxonomy.
//!
//! Every fallible engine operation returns [`EngineResult`]. Cancellation is
//! deliberately absent from this enum: a superseded or skipped request is a
//! normal outcome (`GenerateOutcome::Skipped`), not a failure.

use thiserror::Error;

use crate::backend::BackendError;

/// Convenience alias used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// A failure surfaced to the caller and recorded in the snapshot's
/// `error` slot.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A payload field failed local validation before any network call.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The link existence probe concluded the target does not resolve.
    #[error("link does not appear to exist: {url}")]
    LinkUnavailable { url: String },

    /// Transport-level failure talking to a render backend or the probe.
    #[error(transparent)]
    Network(#[from] BackendError),

    /// The backend answered but reported a failure of its own.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// The customization payload could not be assembled (bad logo bytes,
    /// oversized embed, malformed SVG).
    #[error("could not assemble customization: {reason}")]
    Assembly { reason: String },
}

impl EngineError {
    /// Stable machine-readable label, mirrored into snapshots and events.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation",
            EngineError::LinkUnavailable { .. } => "link_unavailable",
            EngineError::Network(_) => "network",
            EngineError::Backend { .. } => "backend",
            EngineError::Assembly { .. } => "assembly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_name() {
        let err = EngineError::Validation {
            field: "ssid",
            message: "must not be empty".into(),
        };
        assert_eq!(err.to_string(), "invalid ssid: must not be empty");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn backend_status_maps_through_network_variant() {
        let err: EngineError = BackendError::Status { status: 503 }.into();
        assert!(matches!(err, EngineError::Network(_)));
        assert_eq!(err.kind(), "network");
    }
}
