//! In-memory caches using moka
//!
//! - [`ViewpointSetCache`]: landmark id → payload; the default [`OfflineCache`]
//! - [`ImageCache`]: image locator → fetched image, append-only

use crate::provider::{LoadedImage, OfflineCache};
use moka::{future, sync};
use pano_viewpoint::{ImageLocator, LandmarkId, ViewpointSet};
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Approximate number of entries
    pub entry_count: u64,
}

/// Viewpoint payloads by landmark identity
#[derive(Debug, Clone)]
pub struct ViewpointSetCache {
    inner: sync::Cache<LandmarkId, Arc<ViewpointSet>>,
}

impl ViewpointSetCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: sync::Cache::new(max_capacity),
        }
    }

    /// Check if a landmark is cached
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &LandmarkId) -> bool {
        self.inner.contains_key(id)
    }

    /// Drop one landmark
    #[inline]
    pub fn invalidate(&self, id: &LandmarkId) {
        self.inner.invalidate(id);
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ViewpointSetCache {
    /// Create cache with default capacity (128 landmarks)
    fn default() -> Self {
        Self::new(128)
    }
}

impl OfflineCache for ViewpointSetCache {
    fn lookup(&self, id: &LandmarkId) -> Option<Arc<ViewpointSet>> {
        self.inner.get(id)
    }

    fn store(&self, id: LandmarkId, set: Arc<ViewpointSet>) {
        self.inner.insert(id, set);
    }
}

/// Fetched images by stable locator
///
/// Writes never replace an existing entry; eviction is left to the capacity
/// bound.
#[derive(Debug, Clone)]
pub struct ImageCache {
    inner: future::Cache<ImageLocator, LoadedImage>,
}

impl ImageCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: future::Cache::new(max_capacity),
        }
    }

    /// Insert unless already present
    pub async fn insert(&self, image: LoadedImage) {
        self.inner
            .entry(image.locator.clone())
            .or_insert(image)
            .await;
    }

    /// Get image
    #[inline]
    pub async fn get(&self, locator: &ImageLocator) -> Option<LoadedImage> {
        self.inner.get(locator).await
    }

    /// Check presence without waiting
    #[inline]
    #[must_use]
    pub fn contains(&self, locator: &ImageLocator) -> bool {
        self.inner.contains_key(locator)
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ImageCache {
    /// Create cache with default capacity (512 images)
    fn default() -> Self {
        Self::new(512)
    }
}
