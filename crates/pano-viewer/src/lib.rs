//! Pano Viewer - street-level viewing surface
//!
//! Ties viewpoint classification, network-aware loading and navigation into
//! one surface for a presentation layer:
//! - [`StreetViewer`] exposes commands and a subscribable [`ViewerSnapshot`]
//! - [`presentation`] derives overlay and panel view models from a snapshot
//! - [`ViewerConfig`] loads tuning from TOML
//! - [`simulator`] drives a viewer against a seeded random provider
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_viewer::prelude::*;
//!
//! # async fn example(collaborators: Collaborators, landmarks: Vec<pano_viewpoint::Landmark>) -> Result<(), ViewerError> {
//! let viewer = StreetViewer::new(ViewerConfig::default(), collaborators)?;
//! let mut updates = viewer.subscribe();
//!
//! viewer.open_session(landmarks, 0)?;
//! updates.wait_for(ViewerSnapshot::is_settled).await.ok();
//! viewer.next()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod presentation;
pub mod simulator;
pub mod state;
pub mod viewer;

pub use config::{ConfigError, ViewerConfig, VIEWPOINT_TIMEOUT_RANGE_MS};
pub use error::ViewerError;
pub use presentation::{HelpEntry, HelpOverlay, LoadingOverlay, MetadataPanel, NotAvailablePanel};
pub use simulator::{
    run_simulation, simulated_landmarks, LandmarkOutcome, NetworkTier, SimulatedProvider,
    SimulationConfig, SimulationError, SimulationReport,
};
pub use state::{Availability, LoadingState, ViewerSnapshot};
pub use viewer::{Collaborators, StreetViewer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting a viewer
    pub use crate::{
        Availability, Collaborators, HelpOverlay, LoadingOverlay, MetadataPanel,
        NotAvailablePanel, StreetViewer, ViewerConfig, ViewerError, ViewerSnapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
