//! Network-aware concurrency policy
//!
//! Maps a network reading to a [`LoadBudget`]: how many image requests may be
//! outstanding at once and at which [`QualityTier`]. The budget is evaluated
//! once at the start of each batched load and never changes mid-wave.

use crate::provider::NetworkStatus;
use pano_viewpoint::Heading;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

/// Connection class as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectiveType {
    /// Very slow 2G
    #[serde(rename = "slow-2g")]
    Slow2g,
    /// 2G
    #[serde(rename = "2g")]
    TwoG,
    /// 3G
    #[serde(rename = "3g")]
    ThreeG,
    /// 4G or better
    #[serde(rename = "4g")]
    FourG,
    /// Platform does not report a class
    #[serde(rename = "unknown")]
    Unknown,
}

impl FromStr for EffectiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow-2g" => Ok(Self::Slow2g),
            "2g" => Ok(Self::TwoG),
            "3g" => Ok(Self::ThreeG),
            "4g" => Ok(Self::FourG),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown effective type: {other}")),
        }
    }
}

/// One reading from the network-status collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSignal {
    /// Whether the device reports connectivity
    pub is_online: bool,
    /// Connection class
    pub effective_type: EffectiveType,
    /// Measured downlink in Mbps
    pub downlink_mbps: Option<f64>,
    /// When the reading was taken
    pub observed_at: Instant,
}

impl NetworkSignal {
    /// Online reading taken now
    #[inline]
    #[must_use]
    pub fn online(effective_type: EffectiveType, downlink_mbps: Option<f64>) -> Self {
        Self {
            is_online: true,
            effective_type,
            downlink_mbps,
            observed_at: Instant::now(),
        }
    }

    /// Offline reading taken now
    #[inline]
    #[must_use]
    pub fn offline() -> Self {
        Self {
            is_online: false,
            effective_type: EffectiveType::Unknown,
            downlink_mbps: None,
            observed_at: Instant::now(),
        }
    }

    /// With observation time
    #[inline]
    #[must_use]
    pub fn observed_at(mut self, at: Instant) -> Self {
        self.observed_at = at;
        self
    }
}

/// Coarse network quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkQuality {
    /// No connectivity
    Offline,
    /// Slow or unknown-stale
    Low,
    /// Usable
    Medium,
    /// Fast
    High,
}

/// Image resolution requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Small preview
    Thumbnail,
    /// Mid resolution
    Medium,
    /// Full resolution
    Full,
}

impl QualityTier {
    /// Rough size of one image at this tier
    #[inline]
    #[must_use]
    pub fn approx_kb(self) -> u32 {
        match self {
            Self::Thumbnail => 40,
            Self::Medium => 150,
            Self::Full => 450,
        }
    }
}

/// Output of the policy: parallelism and quality for one batched load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadBudget {
    /// Maximum simultaneously outstanding requests; zero means offline
    pub concurrent_loads: usize,
    /// Requested image tier
    pub tier: QualityTier,
    /// Quality class the budget was derived from
    pub quality: NetworkQuality,
}

impl LoadBudget {
    /// Whether no network attempts may be made
    #[inline]
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.concurrent_loads == 0
    }
}

/// Policy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Readings older than this are treated as unknown
    pub stale_after_secs: u64,
    /// Downlink below this forces low quality
    pub low_downlink_mbps: f64,
    /// Downlink below this caps quality at medium
    pub high_downlink_mbps: f64,
    /// Parallelism at medium quality (kept within 2..=3)
    pub medium_concurrency: usize,
    /// Parallelism at high quality (at least 4)
    pub high_concurrency: usize,
    /// Request the full 8-way ring instead of the cardinal four on fast networks
    pub full_ring_on_high: bool,
}

impl PolicyConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Staleness threshold
    #[inline]
    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// With staleness threshold
    #[inline]
    #[must_use]
    pub fn with_stale_after_secs(mut self, secs: u64) -> Self {
        self.stale_after_secs = secs;
        self
    }

    /// With high-quality parallelism
    #[inline]
    #[must_use]
    pub fn with_high_concurrency(mut self, loads: usize) -> Self {
        self.high_concurrency = loads;
        self
    }

    /// With medium-quality parallelism
    #[inline]
    #[must_use]
    pub fn with_medium_concurrency(mut self, loads: usize) -> Self {
        self.medium_concurrency = loads;
        self
    }

    /// With full-ring requests on fast networks
    #[inline]
    #[must_use]
    pub fn with_full_ring_on_high(mut self, enabled: bool) -> Self {
        self.full_ring_on_high = enabled;
        self
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 30,
            low_downlink_mbps: 1.5,
            high_downlink_mbps: 5.0,
            medium_concurrency: 2,
            high_concurrency: 4,
            full_ring_on_high: false,
        }
    }
}

/// Maps network readings to load budgets
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyPolicy {
    config: PolicyConfig,
}

impl ConcurrencyPolicy {
    /// Create policy
    #[inline]
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Policy configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Classify a reading taken relative to `now`
    ///
    /// A missing or stale reading degrades to the most conservative online
    /// class.
    #[must_use]
    pub fn quality(&self, signal: Option<&NetworkSignal>, now: Instant) -> NetworkQuality {
        let Some(signal) = signal else {
            return NetworkQuality::Low;
        };
        if now.saturating_duration_since(signal.observed_at) > self.config.stale_after() {
            tracing::debug!("network reading is stale, assuming low quality");
            return NetworkQuality::Low;
        }
        if !signal.is_online {
            return NetworkQuality::Offline;
        }

        let by_type = match signal.effective_type {
            EffectiveType::Slow2g | EffectiveType::TwoG => Some(NetworkQuality::Low),
            EffectiveType::ThreeG => Some(NetworkQuality::Medium),
            EffectiveType::FourG => Some(NetworkQuality::High),
            EffectiveType::Unknown => None,
        };
        let by_downlink = signal
            .downlink_mbps
            .filter(|mbps| mbps.is_finite() && *mbps >= 0.0)
            .map(|mbps| {
                if mbps < self.config.low_downlink_mbps {
                    NetworkQuality::Low
                } else if mbps < self.config.high_downlink_mbps {
                    NetworkQuality::Medium
                } else {
                    NetworkQuality::High
                }
            });

        match (by_type, by_downlink) {
            (Some(t), Some(d)) => t.min(d),
            (Some(q), None) | (None, Some(q)) => q,
            (None, None) => NetworkQuality::Medium,
        }
    }

    /// Budget for a quality class
    #[must_use]
    pub fn budget_for(&self, quality: NetworkQuality) -> LoadBudget {
        let (concurrent_loads, tier) = match quality {
            NetworkQuality::Offline => (0, QualityTier::Thumbnail),
            NetworkQuality::Low => (1, QualityTier::Thumbnail),
            NetworkQuality::Medium => (
                self.config.medium_concurrency.clamp(2, 3),
                QualityTier::Medium,
            ),
            NetworkQuality::High => (self.config.high_concurrency.max(4), QualityTier::Full),
        };
        LoadBudget {
            concurrent_loads,
            tier,
            quality,
        }
    }

    /// Evaluate a reading into a budget
    #[must_use]
    pub fn evaluate(&self, signal: Option<&NetworkSignal>, now: Instant) -> LoadBudget {
        let budget = self.budget_for(self.quality(signal, now));
        tracing::debug!(
            quality = ?budget.quality,
            concurrent = budget.concurrent_loads,
            tier = ?budget.tier,
            "evaluated load budget"
        );
        budget
    }

    /// Headings to request for a landmark facing `base`
    ///
    /// - offline: none
    /// - low: the facing heading only
    /// - medium: a triad at 120° spacing
    /// - high: the cardinal four, or the 8-way ring when configured
    #[must_use]
    pub fn plan_headings(&self, quality: NetworkQuality, base: Heading) -> Vec<Heading> {
        let (count, step) = match quality {
            NetworkQuality::Offline => return Vec::new(),
            NetworkQuality::Low => (1, 0),
            NetworkQuality::Medium => (3, 120),
            NetworkQuality::High if self.config.full_ring_on_high => (8, 45),
            NetworkQuality::High => (4, 90),
        };
        (0..count).map(|i| base.rotate(i * step)).collect()
    }
}

/// Network-status collaborator backed by a replaceable reading
#[derive(Debug, Default)]
pub struct SharedNetworkStatus {
    reading: Mutex<Option<NetworkSignal>>,
}

impl SharedNetworkStatus {
    /// Create with an initial reading
    #[inline]
    #[must_use]
    pub fn new(reading: Option<NetworkSignal>) -> Self {
        Self {
            reading: Mutex::new(reading),
        }
    }

    /// Replace the reading
    #[inline]
    pub fn set(&self, reading: Option<NetworkSignal>) {
        *self.reading.lock() = reading;
    }
}

impl NetworkStatus for SharedNetworkStatus {
    fn snapshot(&self) -> Option<NetworkSignal> {
        *self.reading.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ConcurrencyPolicy {
        ConcurrencyPolicy::default()
    }

    #[tokio::test]
    async fn offline_has_zero_budget() {
        let now = Instant::now();
        let budget = policy().evaluate(Some(&NetworkSignal::offline()), now);
        assert_eq!(budget.concurrent_loads, 0);
        assert!(budget.is_offline());
    }

    #[tokio::test]
    async fn tiers_follow_effective_type() {
        let now = Instant::now();
        let p = policy();

        let low = p.evaluate(Some(&NetworkSignal::online(EffectiveType::TwoG, None)), now);
        assert_eq!((low.concurrent_loads, low.tier), (1, QualityTier::Thumbnail));

        let medium = p.evaluate(Some(&NetworkSignal::online(EffectiveType::ThreeG, None)), now);
        assert_eq!((medium.concurrent_loads, medium.tier), (2, QualityTier::Medium));

        let high = p.evaluate(Some(&NetworkSignal::online(EffectiveType::FourG, None)), now);
        assert_eq!((high.concurrent_loads, high.tier), (4, QualityTier::Full));
    }

    #[tokio::test]
    async fn slow_downlink_caps_quality() {
        let now = Instant::now();
        let p = policy();
        let signal = NetworkSignal::online(EffectiveType::FourG, Some(2.0));
        assert_eq!(p.quality(Some(&signal), now), NetworkQuality::Medium);

        let signal = NetworkSignal::online(EffectiveType::FourG, Some(0.4));
        assert_eq!(p.quality(Some(&signal), now), NetworkQuality::Low);

        let signal = NetworkSignal::online(EffectiveType::Unknown, Some(12.0));
        assert_eq!(p.quality(Some(&signal), now), NetworkQuality::High);

        let signal = NetworkSignal::online(EffectiveType::Unknown, None);
        assert_eq!(p.quality(Some(&signal), now), NetworkQuality::Medium);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_reading_degrades_to_low() {
        let p = policy();
        let signal = NetworkSignal::online(EffectiveType::FourG, Some(50.0));
        tokio::time::advance(Duration::from_secs(31)).await;

        let budget = p.evaluate(Some(&signal), Instant::now());
        assert_eq!(budget.quality, NetworkQuality::Low);
        assert_eq!(budget.concurrent_loads, 1);

        assert_eq!(p.quality(None, Instant::now()), NetworkQuality::Low);
    }

    #[test]
    fn misconfigured_concurrency_is_clamped() {
        let p = ConcurrencyPolicy::new(
            PolicyConfig::new()
                .with_medium_concurrency(9)
                .with_high_concurrency(1),
        );
        assert_eq!(p.budget_for(NetworkQuality::Medium).concurrent_loads, 3);
        assert_eq!(p.budget_for(NetworkQuality::High).concurrent_loads, 4);
    }

    #[test]
    fn heading_plans() {
        let p = policy();
        let base = Heading::new(30).unwrap();
        let degs = |q| {
            p.plan_headings(q, base)
                .into_iter()
                .map(Heading::degrees)
                .collect::<Vec<_>>()
        };

        assert!(degs(NetworkQuality::Offline).is_empty());
        assert_eq!(degs(NetworkQuality::Low), vec![30]);
        assert_eq!(degs(NetworkQuality::Medium), vec![30, 150, 270]);
        assert_eq!(degs(NetworkQuality::High), vec![30, 120, 210, 300]);

        let ring = ConcurrencyPolicy::new(PolicyConfig::new().with_full_ring_on_high(true));
        assert_eq!(ring.plan_headings(NetworkQuality::High, base).len(), 8);
    }

    #[test]
    fn effective_type_parses() {
        assert_eq!("4G".parse::<EffectiveType>(), Ok(EffectiveType::FourG));
        assert!("5g".parse::<EffectiveType>().is_err());
    }

    #[test]
    fn shared_status_replaces_reading() {
        let status = SharedNetworkStatus::new(None);
        assert!(status.snapshot().is_none());
        status.set(Some(NetworkSignal::offline()));
        assert!(status.snapshot().is_some_and(|s| !s.is_online));
    }
}
