//! Testing utilities for the pano workspace
//!
//! Shared fixtures, a scripted image provider and a recording observer.

#![allow(missing_docs)]

use async_trait::async_trait;
use dashmap::DashMap;
use pano_loader::{ImageProvider, LoadObserver, LoadedImage, ProviderError, QualityTier};
use pano_viewpoint::{
    FallbackInfo, GeoCoordinate, Heading, ImageLocator, Landmark, LandmarkId, MultiViewpoint,
    Viewpoint, ViewpointSet,
};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn coord() -> GeoCoordinate {
    GeoCoordinate::new(48.8584, 2.2945).unwrap()
}

/// Locator used by every fixture viewpoint
pub fn locator(landmark: &str, degrees: u16) -> ImageLocator {
    ImageLocator::new(format!("{landmark}/h{degrees}"))
}

pub fn viewpoint(landmark: &str, degrees: u16) -> Viewpoint {
    Viewpoint::new(
        locator(landmark, degrees),
        Heading::new(degrees).unwrap(),
        coord(),
    )
}

pub fn single_set(landmark: &str) -> ViewpointSet {
    ViewpointSet::Single(viewpoint(landmark, 0))
}

/// Multi payload with one viewpoint per heading, recommended first
pub fn multi_set(landmark: &str, headings: &[u16]) -> ViewpointSet {
    let vps = headings.iter().map(|d| viewpoint(landmark, *d)).collect();
    ViewpointSet::Multi(MultiViewpoint::new(vps, headings.len(), 0).unwrap())
}

/// Multi payload carrying fallback info for `requested`, of which `successful` came back
pub fn multi_set_with_fallback(
    landmark: &str,
    requested: &[u16],
    successful: &[u16],
) -> ViewpointSet {
    let headings = |ds: &[u16]| -> BTreeSet<Heading> {
        ds.iter().map(|d| Heading::new(*d).unwrap()).collect()
    };
    let fallback = FallbackInfo::new(
        headings(requested),
        headings(successful),
        u32::try_from(requested.len() - successful.len()).unwrap(),
    )
    .unwrap();
    let vps = successful.iter().map(|d| viewpoint(landmark, *d)).collect();
    ViewpointSet::Multi(
        MultiViewpoint::new(vps, requested.len(), 0)
            .unwrap()
            .with_fallback(fallback),
    )
}

pub fn landmark(id: &str) -> Landmark {
    Landmark::new(id, format!("Landmark {id}"), coord())
}

/// Landmarks `lm0..lm{n-1}`
pub fn landmarks(n: usize) -> Vec<Landmark> {
    (0..n).map(|i| landmark(&format!("lm{i}"))).collect()
}

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// What the scripted provider observed, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started(ImageLocator),
    Finished(ImageLocator),
}

/// Image provider driven by a script
///
/// Unknown landmarks resolve to `NotFound`. Image fetches succeed after the
/// scripted delay unless a failure is scripted for the locator.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    sets: DashMap<LandmarkId, ViewpointSet>,
    resolve_failures: DashMap<LandmarkId, ProviderError>,
    resolve_delay: Mutex<Duration>,
    image_delays: DashMap<ImageLocator, Duration>,
    image_failures: DashMap<ImageLocator, ProviderError>,
    default_delay: Mutex<Duration>,
    resolve_calls: AtomicUsize,
    fetch_calls: DashMap<ImageLocator, usize>,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
    requested_headings: Mutex<Vec<Vec<Heading>>>,
    events: Mutex<Vec<FetchEvent>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(self, id: &str, set: ViewpointSet) -> Self {
        self.sets.insert(LandmarkId::new(id), set);
        self
    }

    pub fn with_resolve_failure(self, id: &str, error: ProviderError) -> Self {
        self.resolve_failures.insert(LandmarkId::new(id), error);
        self
    }

    pub fn with_resolve_delay(self, delay: Duration) -> Self {
        *self.resolve_delay.lock() = delay;
        self
    }

    pub fn with_default_delay(self, delay: Duration) -> Self {
        *self.default_delay.lock() = delay;
        self
    }

    pub fn with_image_delay(self, locator: ImageLocator, delay: Duration) -> Self {
        self.image_delays.insert(locator, delay);
        self
    }

    pub fn with_image_failure(self, locator: ImageLocator, error: ProviderError) -> Self {
        self.image_failures.insert(locator, error);
        self
    }

    /// Remove a scripted image failure (for retry tests)
    pub fn heal(&self, locator: &ImageLocator) {
        self.image_failures.remove(locator);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self, locator: &ImageLocator) -> usize {
        self.fetch_calls.get(locator).map_or(0, |c| *c)
    }

    pub fn total_fetch_calls(&self) -> usize {
        self.fetch_calls.iter().map(|c| *c.value()).sum()
    }

    /// Highest number of simultaneously outstanding image requests
    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }

    /// Heading lists passed to `resolve`, in call order
    pub fn requested_headings(&self) -> Vec<Vec<Heading>> {
        self.requested_headings.lock().clone()
    }

    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.lock().clone()
    }
}

struct Outstanding<'a> {
    provider: &'a ScriptedProvider,
    locator: ImageLocator,
}

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        self.provider.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.provider
            .events
            .lock()
            .push(FetchEvent::Finished(self.locator.clone()));
    }
}

#[async_trait]
impl ImageProvider for ScriptedProvider {
    async fn resolve(
        &self,
        landmark: &Landmark,
        headings: &[Heading],
    ) -> Result<ViewpointSet, ProviderError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_headings.lock().push(headings.to_vec());

        let delay = *self.resolve_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.resolve_failures.get(&landmark.id) {
            return Err(error.value().clone());
        }
        self.sets
            .get(&landmark.id)
            .map(|set| set.value().clone())
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_image(
        &self,
        viewpoint: &Viewpoint,
        tier: QualityTier,
    ) -> Result<LoadedImage, ProviderError> {
        let locator = viewpoint.image_locator().clone();
        *self.fetch_calls.entry(locator.clone()).or_insert(0) += 1;

        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_outstanding.fetch_max(now, Ordering::SeqCst);
        self.events.lock().push(FetchEvent::Started(locator.clone()));
        let _guard = Outstanding {
            provider: self,
            locator: locator.clone(),
        };

        let delay = self
            .image_delays
            .get(&locator)
            .map_or_else(|| *self.default_delay.lock(), |d| *d);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.image_failures.get(&locator) {
            return Err(error.value().clone());
        }
        Ok(LoadedImage {
            locator,
            tier,
            bytes: u64::from(tier.approx_kb()) * 1024,
        })
    }
}

// ---------------------------------------------------------------------------
// Recording observer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    Progress(u8, String),
    Start(usize),
    Done(usize, bool),
}

/// Observer that records every callback
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    pub fn progress(&self) -> Vec<(u8, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Progress(p, l) => Some((*p, l.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn done(&self) -> Vec<(usize, bool)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Done(i, ok) => Some((*i, *ok)),
                _ => None,
            })
            .collect()
    }
}

impl LoadObserver for RecordingObserver {
    fn on_progress(&self, percent: u8, label: &str) {
        self.events
            .lock()
            .push(ObserverEvent::Progress(percent, label.to_string()));
    }

    fn on_viewpoint_start(&self, index: usize) {
        self.events.lock().push(ObserverEvent::Start(index));
    }

    fn on_viewpoint_done(&self, index: usize, loaded: bool) {
        self.events.lock().push(ObserverEvent::Done(index, loaded));
    }
}
