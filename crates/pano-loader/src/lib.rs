//! Pano Loader - network-aware panorama loading
//!
//! Drives image loading for a viewing surface:
//! - [`ConcurrencyPolicy`] maps network readings to a [`LoadBudget`]
//! - [`BatchedLoader`] loads viewpoints in order-preserving waves
//! - [`LoadController`] keeps at most one load session active per surface
//!   and skips keys that already completed
//! - [`ViewpointSetCache`] / [`ImageCache`] keep payloads and images for
//!   offline use
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_loader::prelude::*;
//!
//! # async fn example(provider: std::sync::Arc<dyn ImageProvider>, vps: &[pano_viewpoint::Viewpoint]) {
//! let policy = ConcurrencyPolicy::default();
//! let budget = policy.evaluate(None, tokio::time::Instant::now());
//! let loader = BatchedLoader::new(provider, ImageCache::default(), LoaderConfig::new().viewpoint_timeout());
//!
//! let order: Vec<usize> = (0..vps.len()).collect();
//! let outcome = loader.load_all(vps, &order, &budget, &NoopObserver, || true).await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod network;
pub mod provider;
pub mod session;

pub use batch::{
    BatchOutcome, BatchReport, BatchedLoader, LoadObserver, NoopObserver, LABEL_CACHED,
    LABEL_LOADING, LABEL_PREPARING, LABEL_PROCESSING, LABEL_READY,
};
pub use cache::{CacheStats, ImageCache, ViewpointSetCache};
pub use config::LoaderConfig;
pub use error::{LoadError, ProviderError, SessionError, UnavailableCause};
pub use network::{
    ConcurrencyPolicy, EffectiveType, LoadBudget, NetworkQuality, NetworkSignal, PolicyConfig,
    QualityTier, SharedNetworkStatus,
};
pub use provider::{ImageProvider, LoadedImage, LocationCallback, NetworkStatus, OfflineCache};
pub use session::{
    allowed_transitions, validate_transition, ControllerStats, LoadController, LoadSession,
    SessionDecision, SessionId, SessionKey, SessionState, SessionTicket,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving loads
    pub use crate::{
        BatchOutcome, BatchedLoader, ConcurrencyPolicy, ImageCache, ImageProvider, LoadBudget,
        LoadController, LoadError, LoadObserver, LoaderConfig, NetworkSignal, NetworkStatus,
        NoopObserver, OfflineCache, ProviderError, SessionDecision, SessionKey,
        ViewpointSetCache,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
