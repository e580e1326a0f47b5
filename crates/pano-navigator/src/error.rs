//! Navigator errors

/// Navigator construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// Landmark list is empty
    #[error("no landmarks to navigate")]
    NoLandmarks,

    /// Landmark index addresses nothing
    #[error("landmark {index} out of range (len {len})")]
    LandmarkOutOfRange {
        /// Requested index
        index: usize,
        /// List length
        len: usize,
    },
}
