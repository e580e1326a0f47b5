use pano_viewer::{run_simulation, NetworkTier, SimulationConfig, ViewerConfig};
use std::io::Write;

#[tokio::test(start_paused = true)]
async fn test_simulation_visits_every_landmark() {
    let config = SimulationConfig {
        seed: 11,
        landmarks: 3,
        network: NetworkTier::High,
        no_data_rate: 0.0,
        image_failure_rate: 0.0,
        ..SimulationConfig::default()
    };
    let report = run_simulation(config).await.unwrap();

    assert_eq!(report.visits.len(), 3);
    assert!(report.visits.iter().all(|v| v.settled));
    assert!(report.resolve_calls >= 3);
    if report.available() == report.visits.len() {
        assert_eq!(report.revisit_network_calls, 0);
        assert_eq!(report.controller.deduplicated, 3);
    }

    let text = report.generate_text();
    assert!(text.contains("Seed: 11"));
    assert!(text.contains("Network: high"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["network"], "high");
}

#[tokio::test(start_paused = true)]
async fn test_offline_simulation_makes_no_calls() {
    let config = SimulationConfig {
        landmarks: 2,
        network: NetworkTier::Offline,
        ..SimulationConfig::default()
    };
    let report = run_simulation(config).await.unwrap();

    assert_eq!(report.resolve_calls, 0);
    assert_eq!(report.image_fetches, 0);
    assert_eq!(report.available(), 0);
    assert!(report
        .visits
        .iter()
        .all(|v| v.availability == "unavailable (offline)"));
}

#[tokio::test(start_paused = true)]
async fn test_low_network_requests_single_views() {
    let config = SimulationConfig {
        seed: 5,
        landmarks: 2,
        network: NetworkTier::Low,
        no_data_rate: 0.0,
        image_failure_rate: 0.0,
        ..SimulationConfig::default()
    };
    let report = run_simulation(config).await.unwrap();
    for visit in report.visits.iter().filter(|v| v.availability == "ready") {
        assert_eq!(visit.viewpoints, 1);
        assert_eq!(visit.strategy, Some("single"));
    }
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "thumbnail_cap = 6\n\n[loader]\nviewpoint_timeout_ms = 12000\n\n[loader.policy]\nhigh_concurrency = 6"
    )
    .unwrap();

    let config = ViewerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.thumbnail_cap, 6);
    assert_eq!(config.loader.viewpoint_timeout_ms, 12_000);
    assert_eq!(config.loader.policy.high_concurrency, 6);
    assert_eq!(config.loader.flicker_hold_ms, 200);
}

#[test]
fn test_config_file_rejects_zero_thumbnails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "thumbnail_cap = 0").unwrap();
    let err = ViewerConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("thumbnail_cap"));
}
