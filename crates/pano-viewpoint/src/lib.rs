//! Pano Viewpoint - street-level viewpoint data model
//!
//! Typed, validated payloads for the street-level view:
//! - [`Viewpoint`]: one directional panorama sample
//! - [`ViewpointSet`]: the per-landmark result (single or multi)
//! - [`FallbackInfo`]: provider coverage for a multi-heading request
//! - [`classify`]: coverage [`Strategy`] for a payload
//! - [`BoundedIndex`] / [`IndexFlags`]: bounds-checked positional state
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_viewpoint::prelude::*;
//!
//! let coord = GeoCoordinate::new(48.8584, 2.2945)?;
//! let set = ViewpointSet::Single(Viewpoint::new("img/1".into(), Heading::NORTH, coord));
//! assert_eq!(classify(&set), Strategy::Single);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod index;
pub mod landmark;
pub mod set;
pub mod strategy;
pub mod viewpoint;

pub use error::ViewpointError;
pub use index::{BoundedIndex, IndexFlags};
pub use landmark::{Landmark, LandmarkId};
pub use set::{DataUsageEstimate, FallbackInfo, MultiViewpoint, ViewpointSet};
pub use strategy::{classify, classify_with, load_order, ClassifierThresholds, Strategy};
pub use viewpoint::{GeoCoordinate, Heading, ImageLocator, Viewpoint, ViewpointStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with viewpoint payloads
    pub use crate::{
        classify, BoundedIndex, GeoCoordinate, Heading, ImageLocator, IndexFlags, Landmark,
        LandmarkId, MultiViewpoint, Strategy, Viewpoint, ViewpointSet,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
