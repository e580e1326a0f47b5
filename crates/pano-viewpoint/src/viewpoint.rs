//! Single directional panorama samples
//!
//! A [`Viewpoint`] is immutable once received from the image provider; the
//! `with_*` builders exist for the provider side that assembles it.

use crate::error::ViewpointError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compass heading in whole degrees, always in `[0, 360)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Heading(u16);

impl Heading {
    /// Due north
    pub const NORTH: Heading = Heading(0);
    /// Due east
    pub const EAST: Heading = Heading(90);
    /// Due south
    pub const SOUTH: Heading = Heading(180);
    /// Due west
    pub const WEST: Heading = Heading(270);

    /// Create a heading, rejecting values of 360 and above
    ///
    /// # Errors
    /// `ViewpointError::InvalidHeading` when `degrees >= 360`
    #[inline]
    pub fn new(degrees: u16) -> Result<Self, ViewpointError> {
        if degrees < 360 {
            Ok(Self(degrees))
        } else {
            Err(ViewpointError::InvalidHeading(degrees))
        }
    }

    /// Create a heading from any integer, wrapping modulo 360
    #[inline]
    #[must_use]
    pub fn wrapping(degrees: i32) -> Self {
        // rem_euclid keeps the value in 0..360
        Self(degrees.rem_euclid(360) as u16)
    }

    /// Heading in degrees
    #[inline]
    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Rotate clockwise by `delta` degrees (negative rotates counter-clockwise)
    #[inline]
    #[must_use]
    pub fn rotate(self, delta: i32) -> Self {
        Self::wrapping(i32::from(self.0) + delta)
    }

    /// Heading in radians
    #[inline]
    #[must_use]
    pub fn radians(self) -> f64 {
        f64::from(self.0).to_radians()
    }

    /// Eight-way compass label ("N", "NE", ...)
    #[must_use]
    pub fn compass_label(self) -> &'static str {
        const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        // Sectors are 45° wide and centred on each label
        let sector = ((u32::from(self.0) + 22) / 45) % 8;
        LABELS[sector as usize]
    }
}

impl TryFrom<u16> for Heading {
    type Error = ViewpointError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Heading> for u16 {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// WGS84 latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl GeoCoordinate {
    /// Create a validated coordinate
    ///
    /// # Errors
    /// `ViewpointError::InvalidCoordinate` for non-finite or out-of-range values
    pub fn new(lat: f64, lng: f64) -> Result<Self, ViewpointError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(ViewpointError::InvalidCoordinate { lat, lng })
        }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Stable image locator used as the image cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageLocator(String);

impl ImageLocator {
    /// Create locator
    #[inline]
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Locator as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-reported status of a viewpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewpointStatus {
    /// Imagery exists for the requested heading
    #[default]
    Ok,
    /// Provider substituted a nearby heading
    Fallback,
    /// Provider returned a record without usable imagery
    Unavailable,
}

/// One directional panoramic image sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewpoint {
    image_locator: ImageLocator,
    heading: Heading,
    pitch: f32,
    field_of_view: f32,
    coordinate: GeoCoordinate,
    display_name: String,
    status: ViewpointStatus,
    attribution: Option<String>,
}

impl Viewpoint {
    /// Default field of view in degrees
    pub const DEFAULT_FIELD_OF_VIEW: f32 = 90.0;

    /// Create a viewpoint facing `heading` at `coordinate`
    #[must_use]
    pub fn new(image_locator: ImageLocator, heading: Heading, coordinate: GeoCoordinate) -> Self {
        Self {
            display_name: format!("View {}", heading.compass_label()),
            image_locator,
            heading,
            pitch: 0.0,
            field_of_view: Self::DEFAULT_FIELD_OF_VIEW,
            coordinate,
            status: ViewpointStatus::Ok,
            attribution: None,
        }
    }

    /// With camera pitch
    #[inline]
    #[must_use]
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// With field of view (clamped to a sensible camera range)
    #[inline]
    #[must_use]
    pub fn with_field_of_view(mut self, fov: f32) -> Self {
        self.field_of_view = fov.clamp(10.0, 120.0);
        self
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// With provider status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ViewpointStatus) -> Self {
        self.status = status;
        self
    }

    /// With attribution text
    #[inline]
    #[must_use]
    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    /// Image locator (cache key)
    #[inline]
    #[must_use]
    pub fn image_locator(&self) -> &ImageLocator {
        &self.image_locator
    }

    /// Camera heading
    #[inline]
    #[must_use]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Camera pitch in degrees
    #[inline]
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Field of view in degrees
    #[inline]
    #[must_use]
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Capture coordinate
    #[inline]
    #[must_use]
    pub fn coordinate(&self) -> GeoCoordinate {
        self.coordinate
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Provider status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ViewpointStatus {
        self.status
    }

    /// Attribution text, if the provider supplied one
    #[inline]
    #[must_use]
    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_rejects_out_of_range() {
        assert!(Heading::new(359).is_ok());
        assert_eq!(Heading::new(360), Err(ViewpointError::InvalidHeading(360)));
    }

    #[test]
    fn heading_wraps() {
        assert_eq!(Heading::wrapping(-90).degrees(), 270);
        assert_eq!(Heading::wrapping(720).degrees(), 0);
        assert_eq!(Heading::new(300).unwrap().rotate(120).degrees(), 60);
    }

    #[test]
    fn heading_compass_labels() {
        assert_eq!(Heading::NORTH.compass_label(), "N");
        assert_eq!(Heading::new(350).unwrap().compass_label(), "N");
        assert_eq!(Heading::new(44).unwrap().compass_label(), "NE");
        assert_eq!(Heading::SOUTH.compass_label(), "S");
        assert_eq!(Heading::new(292).unwrap().compass_label(), "W");
        assert_eq!(Heading::new(293).unwrap().compass_label(), "NW");
    }

    #[test]
    fn heading_serde_validates() {
        let ok: Heading = serde_json::from_str("270").unwrap();
        assert_eq!(ok, Heading::WEST);
        assert!(serde_json::from_str::<Heading>("361").is_err());
    }

    #[test]
    fn coordinate_validation() {
        assert!(GeoCoordinate::new(48.8584, 2.2945).is_ok());
        assert!(GeoCoordinate::new(91.0, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn viewpoint_builder() {
        let coord = GeoCoordinate::new(41.89, 12.49).unwrap();
        let vp = Viewpoint::new(ImageLocator::new("img/1"), Heading::EAST, coord)
            .with_pitch(5.0)
            .with_field_of_view(500.0)
            .with_attribution("© Provider");

        assert_eq!(vp.display_name(), "View E");
        assert_eq!(vp.field_of_view(), 120.0);
        assert_eq!(vp.attribution(), Some("© Provider"));
        assert_eq!(vp.status(), ViewpointStatus::Ok);
    }
}
