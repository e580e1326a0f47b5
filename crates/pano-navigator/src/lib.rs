//! Pano Navigator - viewpoint navigation
//!
//! Input handling for the street-level view:
//! - [`Navigator`]: active landmark/viewpoint and display toggles
//! - [`keymap`]: the declarative binding table and help rows
//! - [`compass`]: dial marker placement by heading
//! - [`thumbnails`]: capped landmark grid
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_navigator::prelude::*;
//!
//! let mut nav = Navigator::new(3, 0)?;
//! nav.set_viewpoint_count(4);
//! let ctx = BindingContext { viewpoint_count: 4, map_available: false };
//! if let Some(resolved) = resolve(KeyStroke::shifted(Key::Right), &ctx) {
//!     nav.apply(resolved.command);
//! }
//! assert_eq!(nav.state().viewpoint_index, 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod compass;
pub mod error;
pub mod keymap;
pub mod navigator;
pub mod thumbnails;

pub use compass::{layout, CompassDial, DialGeometry, DialMarker, Point};
pub use error::NavError;
pub use keymap::{
    help_rows, resolve, resolve_in, Binding, BindingContext, HelpRow, Key, KeyStroke, Resolved,
    BINDINGS,
};
pub use navigator::{NavCommand, NavEvent, Navigator, NavigatorState};
pub use thumbnails::{Thumbnail, ThumbnailGrid, DEFAULT_THUMBNAIL_CAP};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for navigation
    pub use crate::{
        resolve, BindingContext, Key, KeyStroke, NavCommand, NavEvent, Navigator, NavigatorState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
