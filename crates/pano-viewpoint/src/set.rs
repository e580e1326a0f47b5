//! Per-landmark viewpoint payloads
//!
//! A [`ViewpointSet`] is produced by the image provider and consumed read-only.
//! Constructors enforce the payload invariants:
//! - multi-viewpoint sets are non-empty with unique headings
//! - the recommended index addresses a viewpoint
//! - fallback coverage is derived, never supplied

use crate::error::ViewpointError;
use crate::viewpoint::{Heading, Viewpoint};
use serde::Serialize;
use std::collections::BTreeSet;

/// Coverage report for a multi-heading request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackInfo {
    requested_headings: BTreeSet<Heading>,
    successful_headings: BTreeSet<Heading>,
    fallback_count: u32,
    coverage_percent: f64,
}

impl FallbackInfo {
    /// Build fallback info; coverage is computed from the heading sets
    ///
    /// # Errors
    /// - `EmptyRequestedHeadings` when nothing was requested
    /// - `UnrequestedHeading` when a successful heading was not requested
    pub fn new(
        requested_headings: BTreeSet<Heading>,
        successful_headings: BTreeSet<Heading>,
        fallback_count: u32,
    ) -> Result<Self, ViewpointError> {
        if requested_headings.is_empty() {
            return Err(ViewpointError::EmptyRequestedHeadings);
        }
        if let Some(extra) = successful_headings.difference(&requested_headings).next() {
            return Err(ViewpointError::UnrequestedHeading(extra.degrees()));
        }

        let coverage_percent =
            100.0 * successful_headings.len() as f64 / requested_headings.len() as f64;

        Ok(Self {
            requested_headings,
            successful_headings,
            fallback_count,
            coverage_percent,
        })
    }

    /// Headings the provider was asked for
    #[inline]
    #[must_use]
    pub fn requested_headings(&self) -> &BTreeSet<Heading> {
        &self.requested_headings
    }

    /// Headings that returned imagery
    #[inline]
    #[must_use]
    pub fn successful_headings(&self) -> &BTreeSet<Heading> {
        &self.successful_headings
    }

    /// Number of substituted headings
    #[inline]
    #[must_use]
    pub fn fallback_count(&self) -> u32 {
        self.fallback_count
    }

    /// `100 × |successful| / |requested|`
    #[inline]
    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        self.coverage_percent
    }
}

/// Approximate transfer size of a viewpoint set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DataUsageEstimate {
    /// Kilobytes
    pub kilobytes: u32,
}

impl DataUsageEstimate {
    /// Estimate for `count` images of roughly `per_image_kb` each
    #[inline]
    #[must_use]
    pub fn for_images(count: usize, per_image_kb: u32) -> Self {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Self {
            kilobytes: count.saturating_mul(per_image_kb),
        }
    }
}

/// Multi-heading payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiViewpoint {
    primary: Viewpoint,
    viewpoints: Vec<Viewpoint>,
    total_requested: usize,
    recommended_index: usize,
    data_usage: DataUsageEstimate,
    fallback: Option<FallbackInfo>,
}

impl MultiViewpoint {
    /// Build a multi-viewpoint payload
    ///
    /// The primary viewpoint is the recommended one.
    ///
    /// # Errors
    /// - `EmptyViewpoints` for an empty list
    /// - `DuplicateHeading` when two viewpoints share a heading
    /// - `RecommendedIndexOutOfRange` when the index addresses nothing
    pub fn new(
        viewpoints: Vec<Viewpoint>,
        total_requested: usize,
        recommended_index: usize,
    ) -> Result<Self, ViewpointError> {
        if viewpoints.is_empty() {
            return Err(ViewpointError::EmptyViewpoints);
        }

        let mut seen = BTreeSet::new();
        for vp in &viewpoints {
            if !seen.insert(vp.heading()) {
                return Err(ViewpointError::DuplicateHeading(vp.heading().degrees()));
            }
        }

        let primary = viewpoints
            .get(recommended_index)
            .cloned()
            .ok_or(ViewpointError::RecommendedIndexOutOfRange {
                index: recommended_index,
                len: viewpoints.len(),
            })?;

        Ok(Self {
            primary,
            total_requested: total_requested.max(viewpoints.len()),
            viewpoints,
            recommended_index,
            data_usage: DataUsageEstimate::default(),
            fallback: None,
        })
    }

    /// With data usage estimate
    #[inline]
    #[must_use]
    pub fn with_data_usage(mut self, estimate: DataUsageEstimate) -> Self {
        self.data_usage = estimate;
        self
    }

    /// With fallback coverage report
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackInfo) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Primary (recommended) viewpoint
    #[inline]
    #[must_use]
    pub fn primary(&self) -> &Viewpoint {
        &self.primary
    }

    /// Viewpoints in payload order
    #[inline]
    #[must_use]
    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Number of headings requested from the provider
    #[inline]
    #[must_use]
    pub fn total_requested(&self) -> usize {
        self.total_requested
    }

    /// Index of the recommended viewpoint
    #[inline]
    #[must_use]
    pub fn recommended_index(&self) -> usize {
        self.recommended_index
    }

    /// Data usage estimate
    #[inline]
    #[must_use]
    pub fn data_usage(&self) -> DataUsageEstimate {
        self.data_usage
    }

    /// Fallback coverage report
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> Option<&FallbackInfo> {
        self.fallback.as_ref()
    }
}

/// Full per-landmark result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewpointSet {
    /// Exactly one viewpoint
    Single(Viewpoint),
    /// Several viewpoints at distinct headings
    Multi(MultiViewpoint),
}

impl ViewpointSet {
    /// Number of viewpoints
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.viewpoints().len()
    }

    /// Always false: both variants carry at least one viewpoint
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewpoints().is_empty()
    }

    /// Whether the payload is multi-viewpoint with more than one entry
    #[inline]
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.len() > 1
    }

    /// All viewpoints in payload order
    #[must_use]
    pub fn viewpoints(&self) -> &[Viewpoint] {
        match self {
            Self::Single(vp) => std::slice::from_ref(vp),
            Self::Multi(multi) => multi.viewpoints(),
        }
    }

    /// Viewpoint at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Viewpoint> {
        self.viewpoints().get(index)
    }

    /// Primary viewpoint
    #[must_use]
    pub fn primary(&self) -> &Viewpoint {
        match self {
            Self::Single(vp) => vp,
            Self::Multi(multi) => multi.primary(),
        }
    }

    /// Recommended starting index
    #[must_use]
    pub fn recommended_index(&self) -> usize {
        match self {
            Self::Single(_) => 0,
            Self::Multi(multi) => multi.recommended_index(),
        }
    }

    /// Fallback coverage report, if any
    #[must_use]
    pub fn fallback(&self) -> Option<&FallbackInfo> {
        match self {
            Self::Single(_) => None,
            Self::Multi(multi) => multi.fallback(),
        }
    }

    /// Data usage estimate; zero for single payloads
    #[must_use]
    pub fn data_usage(&self) -> DataUsageEstimate {
        match self {
            Self::Single(_) => DataUsageEstimate::default(),
            Self::Multi(multi) => multi.data_usage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewpoint::{GeoCoordinate, ImageLocator};

    fn vp(deg: u16) -> Viewpoint {
        Viewpoint::new(
            ImageLocator::new(format!("img/{deg}")),
            Heading::new(deg).unwrap(),
            GeoCoordinate::new(0.0, 0.0).unwrap(),
        )
    }

    fn headings(degs: &[u16]) -> BTreeSet<Heading> {
        degs.iter().map(|d| Heading::new(*d).unwrap()).collect()
    }

    #[test]
    fn fallback_coverage_is_derived() {
        let info = FallbackInfo::new(headings(&[0, 90, 180, 270]), headings(&[0, 90, 180]), 1)
            .unwrap();
        assert!((info.coverage_percent() - 75.0).abs() < f64::EPSILON);
        assert_eq!(info.fallback_count(), 1);
    }

    #[test]
    fn fallback_rejects_empty_request() {
        let err = FallbackInfo::new(BTreeSet::new(), BTreeSet::new(), 0).unwrap_err();
        assert_eq!(err, ViewpointError::EmptyRequestedHeadings);
    }

    #[test]
    fn fallback_rejects_unrequested_success() {
        let err = FallbackInfo::new(headings(&[0]), headings(&[0, 90]), 0).unwrap_err();
        assert_eq!(err, ViewpointError::UnrequestedHeading(90));
    }

    #[test]
    fn multi_rejects_duplicates_and_bad_index() {
        assert_eq!(
            MultiViewpoint::new(vec![vp(0), vp(0)], 2, 0).unwrap_err(),
            ViewpointError::DuplicateHeading(0)
        );
        assert_eq!(
            MultiViewpoint::new(vec![vp(0), vp(90)], 2, 2).unwrap_err(),
            ViewpointError::RecommendedIndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            MultiViewpoint::new(vec![], 0, 0).unwrap_err(),
            ViewpointError::EmptyViewpoints
        );
    }

    #[test]
    fn multi_primary_is_recommended() {
        let multi = MultiViewpoint::new(vec![vp(0), vp(90), vp(180)], 4, 1).unwrap();
        assert_eq!(multi.primary().heading(), Heading::EAST);
        assert_eq!(multi.total_requested(), 4);

        let set = ViewpointSet::Multi(multi);
        assert_eq!(set.len(), 3);
        assert!(set.is_multi());
        assert_eq!(set.recommended_index(), 1);
    }

    #[test]
    fn single_set_accessors() {
        let set = ViewpointSet::Single(vp(45));
        assert_eq!(set.len(), 1);
        assert!(!set.is_multi());
        assert!(!set.is_empty());
        assert!(set.fallback().is_none());
        assert_eq!(set.get(0).map(Viewpoint::heading), Some(Heading::new(45).unwrap()));
        assert!(set.get(1).is_none());
    }

    #[test]
    fn data_usage_saturates() {
        assert_eq!(DataUsageEstimate::for_images(4, 250).kilobytes, 1000);
        assert_eq!(DataUsageEstimate::for_images(usize::MAX, 2).kilobytes, u32::MAX);
    }
}
