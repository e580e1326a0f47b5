//! Loader configuration

use crate::network::PolicyConfig;
use pano_viewpoint::ClassifierThresholds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loader and controller tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Per-viewpoint timeout in milliseconds
    pub viewpoint_timeout_ms: u64,
    /// How long the loading flag stays up after a successful load
    pub flicker_hold_ms: u64,
    /// Image cache capacity (entries)
    pub image_cache_capacity: u64,
    /// Viewpoint payload cache capacity (landmarks)
    pub set_cache_capacity: u64,
    /// Network policy
    pub policy: PolicyConfig,
    /// Strategy classifier thresholds
    pub thresholds: ClassifierThresholds,
}

impl LoaderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-viewpoint timeout
    #[inline]
    #[must_use]
    pub fn viewpoint_timeout(&self) -> Duration {
        Duration::from_millis(self.viewpoint_timeout_ms)
    }

    /// Flicker hold
    #[inline]
    #[must_use]
    pub fn flicker_hold(&self) -> Duration {
        Duration::from_millis(self.flicker_hold_ms)
    }

    /// With per-viewpoint timeout
    #[inline]
    #[must_use]
    pub fn with_viewpoint_timeout_ms(mut self, ms: u64) -> Self {
        self.viewpoint_timeout_ms = ms;
        self
    }

    /// With flicker hold
    #[inline]
    #[must_use]
    pub fn with_flicker_hold_ms(mut self, ms: u64) -> Self {
        self.flicker_hold_ms = ms;
        self
    }

    /// With network policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// With classifier thresholds
    #[inline]
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            viewpoint_timeout_ms: 10_000,
            flicker_hold_ms: 200,
            image_cache_capacity: 512,
            set_cache_capacity: 128,
            policy: PolicyConfig::default(),
            thresholds: ClassifierThresholds::default(),
        }
    }
}
