//! Error types for viewpoint payload validation

/// Errors raised while constructing viewpoint data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewpointError {
    /// Heading outside [0, 360)
    #[error("heading {0} is outside [0, 360)")]
    InvalidHeading(u16),

    /// Latitude/longitude out of range or not finite
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },

    /// Fallback info must name at least one requested heading
    #[error("fallback info requires at least one requested heading")]
    EmptyRequestedHeadings,

    /// A heading reported successful that was never requested
    #[error("heading {0} reported successful but was not requested")]
    UnrequestedHeading(u16),

    /// Multi-viewpoint payload without viewpoints
    #[error("multi-viewpoint set has no viewpoints")]
    EmptyViewpoints,

    /// Two viewpoints share a heading
    #[error("duplicate heading {0} in viewpoint set")]
    DuplicateHeading(u16),

    /// Recommended index does not address a viewpoint
    #[error("recommended index {index} out of range (len {len})")]
    RecommendedIndexOutOfRange {
        /// Offending index
        index: usize,
        /// Number of viewpoints
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ViewpointError::RecommendedIndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "recommended index 4 out of range (len 2)");
        assert!(ViewpointError::InvalidHeading(400)
            .to_string()
            .contains("400"));
    }
}
