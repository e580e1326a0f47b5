use pano_viewpoint::{
    classify, FallbackInfo, GeoCoordinate, Heading, ImageLocator, MultiViewpoint, Strategy,
    Viewpoint, ViewpointSet,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn ring(count: usize) -> Vec<Heading> {
    (0..count)
        .map(|i| Heading::wrapping(i32::try_from(i * 45).unwrap()))
        .collect()
}

fn set_with_fallback(requested: usize, successful: usize) -> ViewpointSet {
    let requested_headings = ring(requested);
    let successful_headings: BTreeSet<Heading> =
        requested_headings.iter().copied().take(successful).collect();

    // The payload always carries at least one viewpoint, even at zero coverage
    let shown: Vec<Viewpoint> = requested_headings
        .iter()
        .take(successful.max(1))
        .map(|h| {
            Viewpoint::new(
                ImageLocator::new(format!("img/{}", h.degrees())),
                *h,
                GeoCoordinate::new(35.0, 139.0).unwrap(),
            )
        })
        .collect();

    let info = FallbackInfo::new(
        requested_headings.into_iter().collect(),
        successful_headings,
        0,
    )
    .unwrap();

    ViewpointSet::Multi(
        MultiViewpoint::new(shown, requested, 0)
            .unwrap()
            .with_fallback(info),
    )
}

proptest! {
    #[test]
    fn prop_classification_follows_fallback_rules(
        requested in 1..=8usize,
        successful_frac in 0.0..=1.0f64,
    ) {
        let successful = (requested as f64 * successful_frac).floor() as usize;
        let set = set_with_fallback(requested, successful);
        let coverage = 100.0 * successful as f64 / requested as f64;

        let expected = if requested == 1 {
            Strategy::Single
        } else if requested == 4 && coverage >= 75.0 {
            Strategy::Cardinal
        } else if requested <= 3 && coverage >= 66.0 {
            Strategy::Smart
        } else {
            Strategy::All
        };

        prop_assert_eq!(classify(&set), expected);
    }

    #[test]
    fn prop_classification_is_deterministic(requested in 1..=8usize, successful in 0..=8usize) {
        let set = set_with_fallback(requested, successful.min(requested));
        prop_assert_eq!(classify(&set), classify(&set.clone()));
    }
}

#[test]
fn cardinal_at_exact_threshold() {
    assert_eq!(classify(&set_with_fallback(4, 3)), Strategy::Cardinal);
    assert_eq!(classify(&set_with_fallback(4, 2)), Strategy::All);
}

#[test]
fn smart_needs_two_thirds() {
    assert_eq!(classify(&set_with_fallback(3, 2)), Strategy::Smart);
    assert_eq!(classify(&set_with_fallback(3, 1)), Strategy::All);
    assert_eq!(classify(&set_with_fallback(2, 2)), Strategy::Smart);
}

#[test]
fn single_request_is_single_regardless_of_coverage() {
    assert_eq!(classify(&set_with_fallback(1, 0)), Strategy::Single);
    assert_eq!(classify(&set_with_fallback(1, 1)), Strategy::Single);
}
