//! Collaborator interfaces
//!
//! Implement these traits to plug the loader into a real imagery service,
//! platform network API and offline store.

use crate::error::ProviderError;
use crate::network::{NetworkSignal, QualityTier};
use pano_viewpoint::{
    GeoCoordinate, Heading, ImageLocator, Landmark, LandmarkId, Viewpoint, ViewpointSet,
};
use serde::Serialize;
use std::sync::Arc;

/// A fetched image, as far as this core cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedImage {
    /// Locator the image was fetched for
    pub locator: ImageLocator,
    /// Tier it was fetched at
    pub tier: QualityTier,
    /// Transferred size
    pub bytes: u64,
}

/// Street-level imagery service
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Resolve a landmark and requested headings into a viewpoint payload
    async fn resolve(
        &self,
        landmark: &Landmark,
        headings: &[Heading],
    ) -> Result<ViewpointSet, ProviderError>;

    /// Fetch one viewpoint's image
    async fn fetch_image(
        &self,
        viewpoint: &Viewpoint,
        tier: QualityTier,
    ) -> Result<LoadedImage, ProviderError>;
}

/// Platform network-status reading
pub trait NetworkStatus: Send + Sync {
    /// Latest reading, if any
    fn snapshot(&self) -> Option<NetworkSignal>;
}

/// Offline store of viewpoint payloads, keyed by landmark identity
pub trait OfflineCache: Send + Sync {
    /// Cached payload for a landmark
    fn lookup(&self, id: &LandmarkId) -> Option<Arc<ViewpointSet>>;

    /// Remember a payload
    fn store(&self, id: LandmarkId, set: Arc<ViewpointSet>);
}

/// "Show on map" callback
pub type LocationCallback = Arc<dyn Fn(GeoCoordinate) + Send + Sync>;
