//! Published viewer state
//!
//! [`ViewerSnapshot`] is what presentation code renders. The viewer publishes
//! a fresh snapshot through a `tokio::sync::watch` channel after every change.

use pano_loader::{LoadSession, UnavailableCause, LABEL_LOADING};
use pano_navigator::NavigatorState;
use pano_viewpoint::{IndexFlags, Landmark, Strategy, Viewpoint, ViewpointSet};
use std::sync::Arc;

/// Loading indicator state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingState {
    /// Whether a load is running (or in its flicker hold)
    pub is_loading: bool,
    /// Overall progress, 0-100
    pub progress_percent: u8,
    /// Current step label
    pub step_label: String,
    /// Viewpoints with a request outstanding
    pub per_viewpoint_loading: IndexFlags,
}

impl LoadingState {
    /// Fresh loading state for `len` viewpoints
    #[must_use]
    pub fn started(len: usize) -> Self {
        Self {
            is_loading: true,
            progress_percent: 0,
            step_label: LABEL_LOADING.to_string(),
            per_viewpoint_loading: IndexFlags::new(len),
        }
    }
}

/// Whether the active landmark has anything to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// Not resolved yet
    #[default]
    Unknown,
    /// A viewpoint payload is installed
    Ready,
    /// Nothing to show
    Unavailable(UnavailableCause),
}

/// Everything presentation needs
#[derive(Debug, Clone, Default)]
pub struct ViewerSnapshot {
    /// Whether the surface is open
    pub is_open: bool,
    /// Active landmark
    pub landmark: Option<Landmark>,
    /// Coverage strategy of the installed payload
    pub strategy: Option<Strategy>,
    /// Loading indicator
    pub loading: LoadingState,
    /// Navigation state
    pub navigator: NavigatorState,
    /// Availability of the active landmark
    pub availability: Availability,
    /// Installed viewpoint payload
    pub viewpoints: Option<Arc<ViewpointSet>>,
    /// Viewpoints whose image failed (placeholders, retry-eligible)
    pub failed_viewpoints: IndexFlags,
    /// Current load session, if any
    pub session: Option<LoadSession>,
}

impl ViewerSnapshot {
    /// Viewpoint under the navigator
    #[must_use]
    pub fn active_viewpoint(&self) -> Option<&Viewpoint> {
        self.viewpoints
            .as_deref()
            .and_then(|set| set.get(self.navigator.viewpoint_index))
    }

    /// Number of installed viewpoints
    #[must_use]
    pub fn viewpoint_count(&self) -> usize {
        self.viewpoints.as_deref().map_or(0, ViewpointSet::len)
    }

    /// Whether the loading indicator is settled and the landmark resolved
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.loading.is_loading && self.availability != Availability::Unknown
    }

    /// Reset everything tied to the active landmark
    pub(crate) fn clear_landmark(&mut self, landmark: Option<Landmark>) {
        self.landmark = landmark;
        self.strategy = None;
        self.loading = LoadingState::default();
        self.availability = Availability::Unknown;
        self.viewpoints = None;
        self.failed_viewpoints = IndexFlags::default();
    }
}
