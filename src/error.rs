use std::time::Duration;
use thiserror::Error;

use crate::sources::SourceKind;

/// Failure of a single data-source fetch.
///
/// These never abort a digest run; the failing source is replaced with an
/// empty collection.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_kind} request failed: {error}")]
    Request {
        source_kind: SourceKind,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_kind} responded with HTTP {status}")]
    Status {
        source_kind: SourceKind,
        status: reqwest::StatusCode,
    },

    #[error("{source_kind} returned an unreadable body: {error}")]
    Decode {
        source_kind: SourceKind,
        #[source]
        error: serde_json::Error,
    },

    #[error("{source_kind} did not answer within {timeout:?}")]
    Timeout {
        source_kind: SourceKind,
        timeout: Duration,
    },

    #[error("{source_kind} is unavailable: {reason}")]
    Unavailable { source_kind: SourceKind, reason: String },
}

impl SourceError {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            SourceError::Request { source_kind, .. }
            | SourceError::Status { source_kind, .. }
            | SourceError::Decode { source_kind, .. }
            | SourceError::Timeout { source_kind, .. }
            | SourceError::Unavailable { source_kind, .. } => *source_kind,
        }
    }
}
