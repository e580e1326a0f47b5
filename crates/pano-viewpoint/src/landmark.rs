//! Landmarks as handed over by the itinerary owner

use crate::viewpoint::{GeoCoordinate, Heading, ImageLocator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable landmark identity, used as the offline cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandmarkId(String);

impl LandmarkId {
    /// Create id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point of interest with street-level imagery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Stable identity
    pub id: LandmarkId,
    /// Display name
    pub name: String,
    /// Location
    pub coordinate: GeoCoordinate,
    /// Heading that faces the landmark from the street, if known
    pub facing: Option<Heading>,
    /// Thumbnail image, if the itinerary supplies one
    pub thumbnail: Option<ImageLocator>,
}

impl Landmark {
    /// Create landmark
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: GeoCoordinate) -> Self {
        Self {
            id: LandmarkId::new(id),
            name: name.into(),
            coordinate,
            facing: None,
            thumbnail: None,
        }
    }

    /// With facing heading
    #[inline]
    #[must_use]
    pub fn with_facing(mut self, facing: Heading) -> Self {
        self.facing = Some(facing);
        self
    }

    /// With thumbnail locator
    #[inline]
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: ImageLocator) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    /// Facing heading, north when unknown
    #[inline]
    #[must_use]
    pub fn facing_or_north(&self) -> Heading {
        self.facing.unwrap_or(Heading::NORTH)
    }
}
