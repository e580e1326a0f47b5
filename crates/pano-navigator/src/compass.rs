//! Compass dial layout
//!
//! One marker per viewpoint, placed on a circle by heading with north at the
//! top: θ = heading − 90°, position = center + r·(cos θ, sin θ).

use pano_viewpoint::{Heading, Viewpoint};
use serde::Serialize;

/// A point in dial coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal
    pub x: f64,
    /// Vertical
    pub y: f64,
}

/// Dial size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DialGeometry {
    /// Dial center
    pub center: Point,
    /// Marker circle radius
    pub radius: f64,
}

impl Default for DialGeometry {
    fn default() -> Self {
        Self {
            center: Point { x: 50.0, y: 50.0 },
            radius: 40.0,
        }
    }
}

impl DialGeometry {
    /// Position of a heading on the marker circle
    #[must_use]
    pub fn place(&self, heading: Heading) -> Point {
        let theta = (f64::from(heading.degrees()) - 90.0).to_radians();
        Point {
            x: self.center.x + self.radius * theta.cos(),
            y: self.center.y + self.radius * theta.sin(),
        }
    }
}

/// One viewpoint marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialMarker {
    /// Viewpoint index
    pub index: usize,
    /// Heading
    pub heading: Heading,
    /// Compass label (N, NE, ...)
    pub label: &'static str,
    /// Position on the dial
    pub position: Point,
    /// Whether this is the active viewpoint
    pub active: bool,
}

/// Laid-out dial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassDial {
    /// Markers in viewpoint order
    pub markers: Vec<DialMarker>,
    /// Heading of the active viewpoint (needle)
    pub needle: Heading,
}

/// Lay out the dial; `None` (hidden) with one viewpoint or fewer
#[must_use]
pub fn layout(
    viewpoints: &[Viewpoint],
    active: usize,
    geometry: &DialGeometry,
) -> Option<CompassDial> {
    if viewpoints.len() <= 1 {
        return None;
    }
    let active = active.min(viewpoints.len() - 1);
    let markers = viewpoints
        .iter()
        .enumerate()
        .map(|(index, vp)| DialMarker {
            index,
            heading: vp.heading(),
            label: vp.heading().compass_label(),
            position: geometry.place(vp.heading()),
            active: index == active,
        })
        .collect();
    Some(CompassDial {
        markers,
        needle: viewpoints[active].heading(),
    })
}
