//! Seeded simulation of a viewing session
//!
//! Drives a [`StreetViewer`] through every landmark of a generated list
//! against a [`SimulatedProvider`] with random latency and failures, then
//! revisits the list to show completed keys being answered from memory.

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::state::{Availability, ViewerSnapshot};
use crate::viewer::{Collaborators, StreetViewer};
use pano_loader::{
    ControllerStats, EffectiveType, ImageProvider, LoadedImage, NetworkSignal, ProviderError,
    QualityTier, SharedNetworkStatus,
};
use pano_viewpoint::{
    DataUsageEstimate, FallbackInfo, GeoCoordinate, Heading, ImageLocator, Landmark,
    MultiViewpoint, Viewpoint, ViewpointError, ViewpointSet,
};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Simulated connection class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkTier {
    /// No connectivity
    Offline,
    /// 2G-class
    Low,
    /// 3G-class
    Medium,
    /// 4G-class
    High,
}

impl NetworkTier {
    /// Reading the network collaborator reports for this tier
    #[must_use]
    pub fn signal(self) -> NetworkSignal {
        match self {
            Self::Offline => NetworkSignal::offline(),
            Self::Low => NetworkSignal::online(EffectiveType::TwoG, Some(0.8)),
            Self::Medium => NetworkSignal::online(EffectiveType::ThreeG, Some(3.0)),
            Self::High => NetworkSignal::online(EffectiveType::FourG, Some(20.0)),
        }
    }

    /// Tier name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for NetworkTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown network tier: {other}")),
        }
    }
}

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Viewer rejected a command
    #[error(transparent)]
    Viewer(#[from] ViewerError),

    /// Generated fixture was invalid
    #[error(transparent)]
    Viewpoint(#[from] ViewpointError),
}

/// Randomised imagery service
#[derive(Debug)]
pub struct SimulatedProvider {
    rng: Mutex<StdRng>,
    no_data_rate: f64,
    heading_success_rate: f64,
    image_failure_rate: f64,
    max_latency_ms: u64,
    resolve_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl SimulatedProvider {
    /// Create with a seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            no_data_rate: 0.1,
            heading_success_rate: 0.85,
            image_failure_rate: 0.05,
            max_latency_ms: 40,
            resolve_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// With probability that a landmark has no imagery
    #[must_use]
    pub fn with_no_data_rate(mut self, rate: f64) -> Self {
        self.no_data_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// With probability that a requested heading has imagery
    #[must_use]
    pub fn with_heading_success_rate(mut self, rate: f64) -> Self {
        self.heading_success_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// With probability that an image fetch fails
    #[must_use]
    pub fn with_image_failure_rate(mut self, rate: f64) -> Self {
        self.image_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// With upper bound of simulated latency
    #[must_use]
    pub fn with_max_latency_ms(mut self, ms: u64) -> Self {
        self.max_latency_ms = ms;
        self
    }

    /// Resolve calls so far
    #[must_use]
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::Relaxed)
    }

    /// Image fetches so far
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Network calls of either kind
    #[must_use]
    pub fn network_calls(&self) -> usize {
        self.resolve_calls() + self.fetch_calls()
    }

    fn latency(&self, rng: &mut StdRng) -> Duration {
        Duration::from_millis(rng.random_range(0..=self.max_latency_ms))
    }

    fn build_set(
        landmark: &Landmark,
        headings: &[Heading],
        successful: &[Heading],
    ) -> Result<ViewpointSet, ViewpointError> {
        let viewpoint = |heading: Heading| {
            Viewpoint::new(
                ImageLocator::new(format!("sim/{}/h{}", landmark.id, heading.degrees())),
                heading,
                landmark.coordinate,
            )
            .with_display_name(landmark.name.clone())
            .with_attribution("Simulated imagery")
        };

        if headings.len() == 1 {
            return Ok(ViewpointSet::Single(viewpoint(headings[0])));
        }

        let requested: BTreeSet<Heading> = headings.iter().copied().collect();
        let found: BTreeSet<Heading> = successful.iter().copied().collect();
        let missing = u32::try_from(requested.len() - found.len()).unwrap_or(u32::MAX);
        let fallback = FallbackInfo::new(requested, found, missing)?;

        let viewpoints: Vec<Viewpoint> = successful.iter().copied().map(viewpoint).collect();
        let count = viewpoints.len();
        let multi = MultiViewpoint::new(viewpoints, headings.len(), 0)?
            .with_fallback(fallback)
            .with_data_usage(DataUsageEstimate::for_images(
                count,
                QualityTier::Medium.approx_kb(),
            ));
        Ok(ViewpointSet::Multi(multi))
    }
}

#[async_trait::async_trait]
impl ImageProvider for SimulatedProvider {
    async fn resolve(
        &self,
        landmark: &Landmark,
        headings: &[Heading],
    ) -> Result<ViewpointSet, ProviderError> {
        self.resolve_calls.fetch_add(1, Ordering::Relaxed);
        let (delay, no_data, successful) = {
            let mut rng = self.rng.lock();
            let delay = self.latency(&mut rng);
            let no_data = rng.random_bool(self.no_data_rate);
            let successful: Vec<Heading> = headings
                .iter()
                .copied()
                .filter(|_| rng.random_bool(self.heading_success_rate))
                .collect();
            (delay, no_data, successful)
        };
        tokio::time::sleep(delay).await;

        if no_data || headings.is_empty() || successful.is_empty() {
            return Err(ProviderError::NotFound);
        }
        Self::build_set(landmark, headings, &successful).map_err(|error| {
            tracing::warn!(landmark = %landmark.id, %error, "simulated payload rejected");
            ProviderError::NotFound
        })
    }

    async fn fetch_image(
        &self,
        viewpoint: &Viewpoint,
        tier: QualityTier,
    ) -> Result<LoadedImage, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        let (delay, failed) = {
            let mut rng = self.rng.lock();
            (self.latency(&mut rng), rng.random_bool(self.image_failure_rate))
        };
        tokio::time::sleep(delay).await;

        if failed {
            return Err(ProviderError::Network("simulated drop".to_string()));
        }
        Ok(LoadedImage {
            locator: viewpoint.image_locator().clone(),
            tier,
            bytes: u64::from(tier.approx_kb()) * 1024,
        })
    }
}

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Landmarks to visit
    pub landmarks: usize,
    /// Simulated connection
    pub network: NetworkTier,
    /// Probability that a landmark has no imagery
    pub no_data_rate: f64,
    /// Probability that an image fetch fails
    pub image_failure_rate: f64,
    /// Viewer tuning
    pub viewer: ViewerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            landmarks: 5,
            network: NetworkTier::Medium,
            no_data_rate: 0.1,
            image_failure_rate: 0.05,
            viewer: ViewerConfig::default(),
        }
    }
}

/// What one landmark visit ended with
#[derive(Debug, Clone, Serialize)]
pub struct LandmarkOutcome {
    /// Landmark id
    pub landmark: String,
    /// Coverage strategy, if imagery was installed
    pub strategy: Option<&'static str>,
    /// Installed viewpoints
    pub viewpoints: usize,
    /// Viewpoints whose image failed
    pub failed: usize,
    /// Availability label
    pub availability: String,
    /// Whether the visit settled before the deadline
    pub settled: bool,
}

impl LandmarkOutcome {
    fn from_snapshot(snapshot: &ViewerSnapshot, settled: bool) -> Self {
        let availability = match snapshot.availability {
            Availability::Unknown => "unknown".to_string(),
            Availability::Ready => "ready".to_string(),
            Availability::Unavailable(cause) => format!("unavailable ({cause})"),
        };
        Self {
            landmark: snapshot
                .landmark
                .as_ref()
                .map(|l| l.id.to_string())
                .unwrap_or_default(),
            strategy: snapshot.strategy.map(|s| s.name()),
            viewpoints: snapshot.viewpoint_count(),
            failed: snapshot.failed_viewpoints.count(),
            availability,
            settled,
        }
    }
}

/// Final report from a simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Seed used
    pub seed: u64,
    /// Network tier used
    pub network: NetworkTier,
    /// Per-landmark outcomes of the first pass
    pub visits: Vec<LandmarkOutcome>,
    /// Resolve calls in the first pass
    pub resolve_calls: usize,
    /// Image fetches in the first pass
    pub image_fetches: usize,
    /// Network calls made while revisiting every landmark
    pub revisit_network_calls: usize,
    /// Load controller statistics at the end
    pub controller: ControllerStats,
}

impl SimulationReport {
    /// Landmarks that ended with imagery installed
    #[must_use]
    pub fn available(&self) -> usize {
        self.visits.iter().filter(|v| v.availability == "ready").count()
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Pano Simulation Report ===\n\n");
        let _ = writeln!(report, "Seed: {}", self.seed);
        let _ = writeln!(report, "Network: {}", self.network.name());
        let _ = writeln!(
            report,
            "Landmarks: {} ({} available)",
            self.visits.len(),
            self.available()
        );
        let _ = writeln!(report, "Resolve Calls: {}", self.resolve_calls);
        let _ = writeln!(report, "Image Fetches: {}", self.image_fetches);
        let _ = writeln!(report, "Revisit Network Calls: {}", self.revisit_network_calls);
        let _ = writeln!(
            report,
            "Sessions: {} started, {} completed, {} failed, {} superseded, {} deduplicated",
            self.controller.started,
            self.controller.completed,
            self.controller.failed,
            self.controller.superseded,
            self.controller.deduplicated
        );

        report.push_str("\n=== Visits ===\n");
        for (i, visit) in self.visits.iter().enumerate() {
            let _ = writeln!(
                report,
                "{}. {} [{}] strategy={} viewpoints={} failed={}{}",
                i + 1,
                visit.landmark,
                visit.availability,
                visit.strategy.unwrap_or("-"),
                visit.viewpoints,
                visit.failed,
                if visit.settled { "" } else { " (did not settle)" }
            );
        }
        report
    }
}

const SETTLE_DEADLINE: Duration = Duration::from_secs(120);

/// Generated landmark list
///
/// # Errors
/// `ViewpointError` if a generated coordinate is out of range
pub fn simulated_landmarks(count: usize) -> Result<Vec<Landmark>, ViewpointError> {
    (0..count)
        .map(|i| {
            let offset = (i % 1000) as f64 * 0.001;
            let coordinate = GeoCoordinate::new(48.85 + offset, 2.29 + offset)?;
            let facing = Heading::wrapping(i32::try_from(i % 360).unwrap_or(0) * 37);
            Ok(Landmark::new(format!("sim-{i}"), format!("Simulated place {i}"), coordinate)
                .with_facing(facing))
        })
        .collect()
}

/// Wait until the active landmark settles; `false` on deadline
async fn settle(viewer: &StreetViewer) -> bool {
    let mut rx = viewer.subscribe();
    tokio::time::timeout(SETTLE_DEADLINE, rx.wait_for(ViewerSnapshot::is_settled))
        .await
        .is_ok_and(|r| r.is_ok())
}

/// Run a simulation
///
/// # Errors
/// `SimulationError` when the viewer or generated fixtures are rejected
pub async fn run_simulation(config: SimulationConfig) -> Result<SimulationReport, SimulationError> {
    let provider = Arc::new(
        SimulatedProvider::new(config.seed)
            .with_no_data_rate(config.no_data_rate)
            .with_image_failure_rate(config.image_failure_rate),
    );
    let network = Arc::new(SharedNetworkStatus::new(Some(config.network.signal())));
    let viewer = StreetViewer::new(
        config.viewer.clone(),
        Collaborators::new(provider.clone(), network.clone()),
    )?;
    let landmarks = simulated_landmarks(config.landmarks.max(1))?;
    let count = landmarks.len();

    tracing::info!(
        seed = config.seed,
        landmarks = count,
        network = config.network.name(),
        "simulation started"
    );

    let mut visits = Vec::with_capacity(count);
    viewer.open_session(landmarks, 0)?;
    for i in 0..count {
        if i > 0 {
            network.set(Some(config.network.signal()));
            viewer.next()?;
        }
        let settled = settle(&viewer).await;
        visits.push(LandmarkOutcome::from_snapshot(&viewer.snapshot(), settled));
    }

    let resolve_calls = provider.resolve_calls();
    let image_fetches = provider.fetch_calls();

    for i in 0..count {
        network.set(Some(config.network.signal()));
        viewer.select_landmark(i)?;
        settle(&viewer).await;
    }
    let revisit_network_calls = provider.network_calls() - resolve_calls - image_fetches;

    let report = SimulationReport {
        seed: config.seed,
        network: config.network,
        visits,
        resolve_calls,
        image_fetches,
        revisit_network_calls,
        controller: viewer.controller_stats(),
    };
    viewer.close()?;

    tracing::info!(
        available = report.available(),
        revisit_network_calls,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parsing() {
        assert_eq!("HIGH".parse::<NetworkTier>(), Ok(NetworkTier::High));
        assert!("5g".parse::<NetworkTier>().is_err());
        assert!(!NetworkTier::Offline.signal().is_online);
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_payloads() {
        let landmarks = simulated_landmarks(3).unwrap();
        let headings = [Heading::NORTH, Heading::EAST, Heading::SOUTH, Heading::WEST];

        let mut first = Vec::new();
        let mut second = Vec::new();
        for out in [&mut first, &mut second] {
            let provider = SimulatedProvider::new(7).with_no_data_rate(0.0);
            for landmark in &landmarks {
                out.push(provider.resolve(landmark, &headings).await.map(|s| s.len()));
            }
        }
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn certain_no_data_is_not_found() {
        let provider = SimulatedProvider::new(1).with_no_data_rate(1.0);
        let landmark = &simulated_landmarks(1).unwrap()[0];
        let result = provider.resolve(landmark, &[Heading::NORTH]).await;
        assert_eq!(result, Err(ProviderError::NotFound));
        assert_eq!(provider.resolve_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_coverage_reports_fallback() {
        let provider = SimulatedProvider::new(3)
            .with_no_data_rate(0.0)
            .with_heading_success_rate(1.0);
        let landmark = &simulated_landmarks(1).unwrap()[0];
        let headings = [Heading::NORTH, Heading::EAST, Heading::SOUTH, Heading::WEST];
        let set = provider.resolve(landmark, &headings).await.unwrap();
        assert_eq!(set.len(), 4);
        let fallback = set.fallback().unwrap();
        assert!((fallback.coverage_percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(set.data_usage().kilobytes, 4 * QualityTier::Medium.approx_kb());
    }
}
