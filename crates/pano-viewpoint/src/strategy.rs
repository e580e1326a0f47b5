//! Coverage strategy classification
//!
//! [`classify`] labels a [`ViewpointSet`] with the coverage pattern it
//! represents. The label drives presentation and load ordering only; it never
//! changes which viewpoints exist.

use crate::set::ViewpointSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coverage pattern of a landmark's viewpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One viewpoint
    Single,
    /// The four compass directions
    Cardinal,
    /// A reduced set of well-covered headings
    Smart,
    /// Everything the provider returned
    All,
}

impl Strategy {
    /// Short machine name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Cardinal => "cardinal",
            Self::Smart => "smart",
            Self::All => "all",
        }
    }

    /// Label shown in the metadata panel
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Single => "Single view",
            Self::Cardinal => "Cardinal directions",
            Self::Smart => "Smart coverage",
            Self::All => "All directions",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coverage thresholds (percent) used by [`classify_with`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Minimum coverage for a four-heading request to count as cardinal
    pub cardinal_min_coverage: f64,
    /// Minimum coverage for a request of up to three headings to count as smart
    pub smart_min_coverage: f64,
}

impl ClassifierThresholds {
    /// Create default thresholds
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cardinal threshold
    #[inline]
    #[must_use]
    pub fn with_cardinal_min_coverage(mut self, percent: f64) -> Self {
        self.cardinal_min_coverage = percent;
        self
    }

    /// With smart threshold
    #[inline]
    #[must_use]
    pub fn with_smart_min_coverage(mut self, percent: f64) -> Self {
        self.smart_min_coverage = percent;
        self
    }
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            cardinal_min_coverage: 75.0,
            smart_min_coverage: 66.0,
        }
    }
}

/// Classify with default thresholds
#[inline]
#[must_use]
pub fn classify(set: &ViewpointSet) -> Strategy {
    classify_with(set, &ClassifierThresholds::default())
}

/// Classify a viewpoint payload
///
/// Rules, first match wins:
/// 1. single payload → `Single`
/// 2. with fallback info, by requested count and coverage
/// 3. otherwise by raw viewpoint count
#[must_use]
pub fn classify_with(set: &ViewpointSet, thresholds: &ClassifierThresholds) -> Strategy {
    let multi = match set {
        ViewpointSet::Single(_) => return Strategy::Single,
        ViewpointSet::Multi(multi) => multi,
    };

    if let Some(info) = multi.fallback() {
        let requested = info.requested_headings().len();
        let coverage = info.coverage_percent();
        return match requested {
            1 => Strategy::Single,
            4 if coverage >= thresholds.cardinal_min_coverage => Strategy::Cardinal,
            n if n <= 3 && coverage >= thresholds.smart_min_coverage => Strategy::Smart,
            _ => Strategy::All,
        };
    }

    match multi.viewpoints().len() {
        1 => Strategy::Single,
        4 => Strategy::Cardinal,
        n if n <= 3 => Strategy::Smart,
        _ => Strategy::All,
    }
}

/// Load order: recommended viewpoint first, then payload order
#[must_use]
pub fn load_order(set: &ViewpointSet) -> Vec<usize> {
    let recommended = set.recommended_index();
    std::iter::once(recommended)
        .chain((0..set.len()).filter(|i| *i != recommended))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::{FallbackInfo, MultiViewpoint};
    use crate::viewpoint::{GeoCoordinate, Heading, ImageLocator, Viewpoint};
    use std::collections::BTreeSet;

    fn vp(deg: u16) -> Viewpoint {
        Viewpoint::new(
            ImageLocator::new(format!("img/{deg}")),
            Heading::new(deg).unwrap(),
            GeoCoordinate::new(0.0, 0.0).unwrap(),
        )
    }

    fn multi(degs: &[u16]) -> MultiViewpoint {
        MultiViewpoint::new(degs.iter().map(|d| vp(*d)).collect(), degs.len(), 0).unwrap()
    }

    fn fallback(requested: &[u16], ok: &[u16]) -> FallbackInfo {
        let h = |d: &[u16]| d.iter().map(|x| Heading::new(*x).unwrap()).collect::<BTreeSet<_>>();
        FallbackInfo::new(h(requested), h(ok), 0).unwrap()
    }

    #[test]
    fn single_payload_is_single() {
        assert_eq!(classify(&ViewpointSet::Single(vp(0))), Strategy::Single);
    }

    #[test]
    fn raw_count_rules() {
        assert_eq!(classify(&ViewpointSet::Multi(multi(&[0]))), Strategy::Single);
        assert_eq!(classify(&ViewpointSet::Multi(multi(&[0, 120]))), Strategy::Smart);
        assert_eq!(
            classify(&ViewpointSet::Multi(multi(&[0, 90, 180, 270]))),
            Strategy::Cardinal
        );
        assert_eq!(
            classify(&ViewpointSet::Multi(multi(&[0, 45, 90, 135, 180]))),
            Strategy::All
        );
    }

    #[test]
    fn fallback_rules_take_precedence() {
        // Three viewpoints would be smart by count, but a 4-heading request at 75% is cardinal
        let set = ViewpointSet::Multi(
            multi(&[0, 90, 180]).with_fallback(fallback(&[0, 90, 180, 270], &[0, 90, 180])),
        );
        assert_eq!(classify(&set), Strategy::Cardinal);

        let low = ViewpointSet::Multi(
            multi(&[0, 90]).with_fallback(fallback(&[0, 90, 180, 270], &[0, 90])),
        );
        assert_eq!(classify(&low), Strategy::All);

        let smart = ViewpointSet::Multi(
            multi(&[0, 120]).with_fallback(fallback(&[0, 120, 240], &[0, 120])),
        );
        assert_eq!(classify(&smart), Strategy::Smart);
    }

    #[test]
    fn thresholds_are_configurable() {
        let set = ViewpointSet::Multi(
            multi(&[0, 90, 180]).with_fallback(fallback(&[0, 90, 180, 270], &[0, 90, 180])),
        );
        let strict = ClassifierThresholds::new().with_cardinal_min_coverage(80.0);
        assert_eq!(classify_with(&set, &strict), Strategy::All);
    }

    #[test]
    fn load_order_puts_recommended_first() {
        let m = MultiViewpoint::new(vec![vp(0), vp(90), vp(180)], 3, 2).unwrap();
        assert_eq!(load_order(&ViewpointSet::Multi(m)), vec![2, 0, 1]);
        assert_eq!(load_order(&ViewpointSet::Single(vp(0))), vec![0]);
    }
}
