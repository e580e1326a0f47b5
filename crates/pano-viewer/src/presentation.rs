//! Presentation view models
//!
//! Plain data derived from a [`ViewerSnapshot`]. Rendering is up to the host;
//! these only decide what is visible and what it says.

use crate::state::{Availability, ViewerSnapshot};
use pano_loader::UnavailableCause;
use pano_navigator::help_rows;
use serde::Serialize;

/// Loading overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingOverlay {
    /// Shown while loading
    pub visible: bool,
    /// Progress, 0-100
    pub percent: u8,
    /// Step label
    pub label: String,
    /// Viewpoints with a request outstanding
    pub pending_viewpoints: usize,
}

impl LoadingOverlay {
    /// Overlay for a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &ViewerSnapshot) -> Self {
        let loading = &snapshot.loading;
        Self {
            visible: loading.is_loading,
            percent: loading.progress_percent,
            label: loading.step_label.clone(),
            pending_viewpoints: loading.per_viewpoint_loading.count(),
        }
    }
}

/// Metadata panel for the active viewpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataPanel {
    /// Place name
    pub display_name: String,
    /// Formatted coordinate
    pub coordinate: String,
    /// Heading in degrees
    pub heading_degrees: u16,
    /// Compass direction (N, NE, ...)
    pub direction: &'static str,
    /// Imagery attribution
    pub attribution: Option<String>,
    /// Coverage strategy label
    pub strategy: Option<&'static str>,
    /// "View i of n" for multi-viewpoint landmarks
    pub position: Option<String>,
    /// Estimated transfer for the whole set
    pub data_usage_kb: u32,
    /// Whether the active viewpoint's image failed
    pub placeholder: bool,
}

impl MetadataPanel {
    /// Panel for a snapshot; `None` while info is hidden or nothing is installed
    #[must_use]
    pub fn from_snapshot(snapshot: &ViewerSnapshot) -> Option<Self> {
        if !snapshot.navigator.is_info_visible {
            return None;
        }
        let viewpoint = snapshot.active_viewpoint()?;
        let set = snapshot.viewpoints.as_deref()?;
        let index = snapshot.navigator.viewpoint_index;

        Some(Self {
            display_name: viewpoint.display_name().to_string(),
            coordinate: viewpoint.coordinate().to_string(),
            heading_degrees: viewpoint.heading().degrees(),
            direction: viewpoint.heading().compass_label(),
            attribution: viewpoint.attribution().map(str::to_string),
            strategy: snapshot.strategy.map(|s| s.label()),
            position: set
                .is_multi()
                .then(|| format!("View {} of {}", index + 1, set.len())),
            data_usage_kb: set.data_usage().kilobytes,
            placeholder: snapshot.failed_viewpoints.is_set(index),
        })
    }
}

/// Explicit not-available state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotAvailablePanel {
    /// Why nothing is shown
    pub cause: UnavailableCause,
    /// Headline
    pub title: &'static str,
    /// Explanation
    pub message: &'static str,
    /// Whether retrying can help right now
    pub can_retry: bool,
}

impl NotAvailablePanel {
    /// Panel for a snapshot; `None` unless the landmark is unavailable
    #[must_use]
    pub fn from_snapshot(snapshot: &ViewerSnapshot) -> Option<Self> {
        let Availability::Unavailable(cause) = snapshot.availability else {
            return None;
        };
        Some(match cause {
            UnavailableCause::Offline => Self {
                cause,
                title: "You're offline",
                message: "Street view for this place was not saved for offline use.",
                can_retry: false,
            },
            UnavailableCause::NoData => Self {
                cause,
                title: "Street view not available",
                message: "No street-level imagery exists near this place.",
                can_retry: true,
            },
        })
    }
}

/// One help overlay row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Key label
    pub keys: &'static str,
    /// What it does
    pub description: &'static str,
}

/// Keyboard help overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpOverlay {
    /// Rows in table order
    pub rows: Vec<HelpEntry>,
}

impl HelpOverlay {
    /// Overlay built from the binding table
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: help_rows()
                .into_iter()
                .map(|row| HelpEntry {
                    keys: row.keys,
                    description: row.description,
                })
                .collect(),
        }
    }

    /// Overlay for a snapshot; `None` while help is hidden
    #[must_use]
    pub fn from_snapshot(snapshot: &ViewerSnapshot) -> Option<Self> {
        snapshot.navigator.is_help_visible.then(Self::new)
    }

    /// Aligned two-column text
    #[must_use]
    pub fn render_text(&self) -> String {
        let width = self.rows.iter().map(|r| r.keys.len()).max().unwrap_or(0);
        self.rows
            .iter()
            .map(|r| format!("{:<width$}  {}\n", r.keys, r.description))
            .collect()
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}
