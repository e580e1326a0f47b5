//! Viewer errors

use crate::config::ConfigError;
use pano_navigator::NavError;

/// Command misuse on the viewing surface
///
/// Load failures never show up here; they are state, not errors.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Landmark list is empty
    #[error("no landmarks to show")]
    NoLandmarks,

    /// Landmark index addresses nothing
    #[error("landmark {index} out of range (len {len})")]
    LandmarkOutOfRange {
        /// Requested index
        index: usize,
        /// List length
        len: usize,
    },

    /// Command issued while the surface is closed
    #[error("viewer is closed")]
    SurfaceClosed,

    /// Constructed outside a tokio runtime
    #[error("no tokio runtime available")]
    NoRuntime,

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<NavError> for ViewerError {
    fn from(error: NavError) -> Self {
        match error {
            NavError::NoLandmarks => Self::NoLandmarks,
            NavError::LandmarkOutOfRange { index, len } => Self::LandmarkOutOfRange { index, len },
        }
    }
}

impl ViewerError {
    /// Whether reopening the surface resolves the error
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::SurfaceClosed)
    }
}
