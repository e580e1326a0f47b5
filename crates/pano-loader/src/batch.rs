//! Batched image loader
//!
//! Loads viewpoint images in order-preserving waves. Every request of a wave
//! is started together and the wave is awaited as a whole before the next one
//! starts. A single failure never aborts its wave.
//!
//! Supersession is cooperative: the `still_active` probe is consulted before
//! each wave and before completion. Requests already in flight are not
//! aborted; their results are discarded.

use crate::cache::ImageCache;
use crate::error::{LoadError, ProviderError, UnavailableCause};
use crate::network::{LoadBudget, QualityTier};
use crate::provider::{ImageProvider, LoadedImage};
use futures::future::join_all;
use pano_viewpoint::{IndexFlags, Viewpoint};
use std::sync::Arc;
use std::time::Duration;

/// Progress label before the single request starts
pub const LABEL_LOADING: &str = "Loading street view";
/// Progress label once the single request settled
pub const LABEL_PROCESSING: &str = "Processing image";
/// Progress label right before completion
pub const LABEL_PREPARING: &str = "Preparing view";
/// Progress label at completion
pub const LABEL_READY: &str = "Ready";
/// Progress label for the offline short-circuit
pub const LABEL_CACHED: &str = "Showing cached imagery";

/// Receives load progress
///
/// Per-viewpoint callbacks fire only while the session is active.
pub trait LoadObserver: Send + Sync {
    /// Overall progress in percent with a step label
    fn on_progress(&self, percent: u8, label: &str);

    /// A viewpoint request was issued
    fn on_viewpoint_start(&self, _index: usize) {}

    /// A viewpoint request settled
    fn on_viewpoint_done(&self, _index: usize, _loaded: bool) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {
    fn on_progress(&self, _percent: u8, _label: &str) {}
}

/// Per-index results of a batched load
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Waves issued
    pub waves: usize,
    /// Viewpoints attempted
    pub attempted: usize,
    /// Successfully loaded indices
    pub loaded: IndexFlags,
    /// Failed indices (placeholder, retry-eligible)
    pub failed: IndexFlags,
    /// Failure details, one per failed index
    pub errors: Vec<LoadError>,
}

impl BatchReport {
    fn new(len: usize) -> Self {
        Self {
            loaded: IndexFlags::new(len),
            failed: IndexFlags::new(len),
            ..Self::default()
        }
    }

    fn record(&mut self, index: usize, result: Result<LoadedImage, ProviderError>) {
        match result {
            Ok(_) => {
                self.loaded.set(index);
                self.failed.clear(index);
            }
            Err(source) => {
                let error = LoadError::ViewpointFailed { index, source };
                tracing::warn!(%error, "viewpoint load failed");
                self.failed.set(index);
                self.errors.push(error);
            }
        }
    }

    /// Whether nothing loaded although something was attempted
    #[inline]
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && !self.loaded.any()
    }
}

/// Result of [`BatchedLoader::load_all`]
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// All waves ran while the session stayed active
    Completed(BatchReport),
    /// Budget was zero; answered from the image cache without network calls
    Offline(BatchReport),
    /// Session went inactive; results discarded
    Superseded {
        /// Waves that settled before supersession was noticed
        waves_completed: usize,
    },
}

/// Wave-based image loader
pub struct BatchedLoader {
    provider: Arc<dyn ImageProvider>,
    images: ImageCache,
    timeout: Duration,
}

impl std::fmt::Debug for BatchedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchedLoader")
            .field("images", &self.images)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl BatchedLoader {
    /// Create loader
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn ImageProvider>, images: ImageCache, timeout: Duration) -> Self {
        Self {
            provider,
            images,
            timeout,
        }
    }

    /// Shared image cache
    #[inline]
    #[must_use]
    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Load `viewpoints` in `order`, `budget.concurrent_loads` at a time
    ///
    /// Out-of-range indices in `order` are skipped.
    pub async fn load_all<F>(
        &self,
        viewpoints: &[Viewpoint],
        order: &[usize],
        budget: &LoadBudget,
        observer: &dyn LoadObserver,
        still_active: F,
    ) -> BatchOutcome
    where
        F: Fn() -> bool + Sync,
    {
        let order: Vec<usize> = order
            .iter()
            .copied()
            .filter(|i| *i < viewpoints.len())
            .collect();

        if budget.is_offline() {
            return BatchOutcome::Offline(self.load_cached(viewpoints, &order, observer));
        }
        if order.is_empty() {
            observer.on_progress(100, LABEL_READY);
            return BatchOutcome::Completed(BatchReport::new(viewpoints.len()));
        }
        if order.len() == 1 {
            return self
                .load_single(viewpoints, order[0], budget.tier, observer, &still_active)
                .await;
        }

        let total = order.len();
        let mut report = BatchReport::new(viewpoints.len());
        let still_active = &still_active;

        for (wave_no, wave) in order.chunks(budget.concurrent_loads).enumerate() {
            if !still_active() {
                tracing::debug!(wave = wave_no, "session inactive before wave, aborting");
                return BatchOutcome::Superseded {
                    waves_completed: wave_no,
                };
            }
            tracing::debug!(wave = wave_no, size = wave.len(), "starting wave");

            let settled = join_all(wave.iter().map(|&index| {
                let viewpoint = &viewpoints[index];
                observer.on_viewpoint_start(index);
                async move {
                    let result = self.load_one(viewpoint, budget.tier).await;
                    if still_active() {
                        observer.on_viewpoint_done(index, result.is_ok());
                    }
                    (index, result)
                }
            }))
            .await;

            if !still_active() {
                tracing::debug!(wave = wave_no, "session inactive after wave, discarding");
                return BatchOutcome::Superseded {
                    waves_completed: wave_no + 1,
                };
            }

            for (index, result) in settled {
                report.record(index, result);
            }
            report.waves += 1;
            report.attempted += wave.len();
            observer.on_progress(
                percent(report.attempted, total),
                &format!("Loaded {} of {} views", report.attempted, total),
            );
        }

        if !still_active() {
            return BatchOutcome::Superseded {
                waves_completed: report.waves,
            };
        }
        BatchOutcome::Completed(report)
    }

    /// Answer from the image cache only; never touches the network
    pub fn load_cached(
        &self,
        viewpoints: &[Viewpoint],
        order: &[usize],
        observer: &dyn LoadObserver,
    ) -> BatchReport {
        let mut report = BatchReport::new(viewpoints.len());
        for &index in order {
            let Some(viewpoint) = viewpoints.get(index) else {
                continue;
            };
            if self.images.contains(viewpoint.image_locator()) {
                report.loaded.set(index);
            } else {
                report.failed.set(index);
                report.errors.push(LoadError::ProviderUnavailable(UnavailableCause::Offline));
            }
            report.attempted += 1;
            observer.on_viewpoint_done(index, report.loaded.is_set(index));
        }
        observer.on_progress(100, LABEL_CACHED);
        report
    }

    async fn load_single<F>(
        &self,
        viewpoints: &[Viewpoint],
        index: usize,
        tier: QualityTier,
        observer: &dyn LoadObserver,
        still_active: &F,
    ) -> BatchOutcome
    where
        F: Fn() -> bool + Sync,
    {
        if !still_active() {
            return BatchOutcome::Superseded { waves_completed: 0 };
        }
        let mut report = BatchReport::new(viewpoints.len());

        observer.on_progress(25, LABEL_LOADING);
        observer.on_viewpoint_start(index);
        let result = self.load_one(&viewpoints[index], tier).await;

        if !still_active() {
            return BatchOutcome::Superseded { waves_completed: 1 };
        }
        observer.on_viewpoint_done(index, result.is_ok());
        report.record(index, result);
        report.waves = 1;
        report.attempted = 1;

        observer.on_progress(75, LABEL_PROCESSING);
        observer.on_progress(90, LABEL_PREPARING);
        if !still_active() {
            return BatchOutcome::Superseded { waves_completed: 1 };
        }
        observer.on_progress(100, LABEL_READY);
        BatchOutcome::Completed(report)
    }

    async fn load_one(
        &self,
        viewpoint: &Viewpoint,
        tier: QualityTier,
    ) -> Result<LoadedImage, ProviderError> {
        if let Some(image) = self.images.get(viewpoint.image_locator()).await {
            tracing::trace!(locator = %viewpoint.image_locator(), "image cache hit");
            return Ok(image);
        }

        match tokio::time::timeout(self.timeout, self.provider.fetch_image(viewpoint, tier)).await
        {
            Ok(Ok(image)) => {
                self.images.insert(image.clone()).await;
                Ok(image)
            }
            Ok(Err(error)) => Err(error),
            Err(_) => Err(ProviderError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from(done.min(total) * 100 / total).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down_and_caps() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn report_tracks_failures() {
        let mut report = BatchReport::new(3);
        report.record(0, Err(ProviderError::NotFound));
        report.attempted = 1;
        assert!(report.all_failed());
        assert!(report.failed.is_set(0));
        assert_eq!(report.errors.len(), 1);
    }
}
