//! Landmark thumbnail grid

use crate::navigator::NavCommand;
use pano_viewpoint::{ImageLocator, Landmark};
use serde::Serialize;

/// Default number of thumbnails shown
pub const DEFAULT_THUMBNAIL_CAP: usize = 8;

/// One grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    /// Index in the landmark list
    pub landmark_index: usize,
    /// Caption
    pub name: String,
    /// Image, if the landmark has one
    pub locator: Option<ImageLocator>,
    /// Whether this is the active landmark
    pub active: bool,
}

/// Capped list of landmark thumbnails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailGrid {
    items: Vec<Thumbnail>,
    hidden: usize,
}

impl ThumbnailGrid {
    /// Build the grid for the first `cap` landmarks
    #[must_use]
    pub fn new(landmarks: &[Landmark], active: usize, cap: usize) -> Self {
        let items = landmarks
            .iter()
            .take(cap)
            .enumerate()
            .map(|(landmark_index, lm)| Thumbnail {
                landmark_index,
                name: lm.name.clone(),
                locator: lm.thumbnail.clone(),
                active: landmark_index == active,
            })
            .collect();
        Self {
            items,
            hidden: landmarks.len().saturating_sub(cap),
        }
    }

    /// Cells in display order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Thumbnail] {
        &self.items
    }

    /// Landmarks left out by the cap
    #[inline]
    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// Command for a click on cell `position`
    #[must_use]
    pub fn click(&self, position: usize) -> Option<NavCommand> {
        self.items
            .get(position)
            .map(|t| NavCommand::SelectLandmark(t.landmark_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_viewpoint::GeoCoordinate;

    fn landmarks(n: usize) -> Vec<Landmark> {
        (0..n)
            .map(|i| {
                Landmark::new(
                    format!("lm{i}"),
                    format!("Landmark {i}"),
                    GeoCoordinate::new(0.0, 0.0).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn caps_and_counts_hidden() {
        let grid = ThumbnailGrid::new(&landmarks(11), 2, DEFAULT_THUMBNAIL_CAP);
        assert_eq!(grid.items().len(), 8);
        assert_eq!(grid.hidden(), 3);
        assert!(grid.items()[2].active);
    }

    #[test]
    fn click_selects_landmark() {
        let grid = ThumbnailGrid::new(&landmarks(3), 0, DEFAULT_THUMBNAIL_CAP);
        assert_eq!(grid.click(1), Some(NavCommand::SelectLandmark(1)));
        assert_eq!(grid.click(5), None);
    }
}
