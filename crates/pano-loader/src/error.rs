//! Error types for panorama loading
//!
//! The taxonomy the rest of the workspace reasons about:
//! - [`ProviderError`]: what an image provider call can return
//! - [`LoadError`]: how a load outcome is classified for the surface
//! - [`SessionError`]: controller state-machine misuse

use crate::session::SessionState;
use serde::Serialize;
use std::fmt;

/// Failures reported by the image provider collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No imagery for the request
    #[error("no imagery found")]
    NotFound,

    /// Provider quota exceeded
    #[error("rate limited")]
    RateLimited {
        /// Suggested back-off, if the provider sent one
        retry_after_secs: Option<u64>,
    },

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Per-viewpoint timeout elapsed
    #[error("timed out after {after_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        after_ms: u64,
    },
}

impl ProviderError {
    /// Check if a later attempt may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Why a landmark has nothing to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableCause {
    /// Device offline and nothing cached
    Offline,
    /// Provider has no usable data for the landmark
    NoData,
}

impl fmt::Display for UnavailableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("offline"),
            Self::NoData => f.write_str("no data"),
        }
    }
}

/// Load outcome classification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Landmark has no viewpoint data
    #[error("street-level imagery unavailable ({0})")]
    ProviderUnavailable(UnavailableCause),

    /// One viewpoint failed; tolerated
    #[error("viewpoint {index} failed: {source}")]
    ViewpointFailed {
        /// Viewpoint index
        index: usize,
        /// Underlying provider error
        source: ProviderError,
    },

    /// Navigation moved on before the load finished
    #[error("session superseded")]
    SessionSuperseded,

    /// Surface closed mid-load
    #[error("load cancelled")]
    Cancelled,
}

impl LoadError {
    /// Whether the error is shown to the user at all
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::ViewpointFailed { .. })
    }

    /// Collapse a provider failure on the whole-landmark request
    #[must_use]
    pub fn from_resolve(error: &ProviderError) -> Self {
        // Every resolve failure reads as "no data" to the surface
        tracing::debug!(%error, "collapsing resolve failure to no-data");
        Self::ProviderUnavailable(UnavailableCause::NoData)
    }
}

/// Load controller errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Transition not in the allowed table
    #[error("illegal session transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: SessionState,
        /// Requested state
        to: SessionState,
    },
}
