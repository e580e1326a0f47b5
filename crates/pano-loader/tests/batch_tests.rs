use pano_loader::{
    BatchOutcome, BatchedLoader, ImageCache, LoadBudget, LoadError, LoadedImage, NetworkQuality,
    ProviderError, QualityTier, LABEL_CACHED, LABEL_LOADING, LABEL_PREPARING, LABEL_PROCESSING,
    LABEL_READY,
};
use pano_test_utils::{locator, viewpoint, FetchEvent, RecordingObserver, ScriptedProvider};
use pano_viewpoint::Viewpoint;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

fn budget(concurrent_loads: usize) -> LoadBudget {
    LoadBudget {
        concurrent_loads,
        tier: QualityTier::Medium,
        quality: NetworkQuality::Medium,
    }
}

fn ring(n: usize) -> Vec<Viewpoint> {
    (0..n)
        .map(|i| viewpoint("lm", u16::try_from(i * 45).unwrap()))
        .collect()
}

fn loader(provider: &Arc<ScriptedProvider>) -> BatchedLoader {
    BatchedLoader::new(provider.clone(), ImageCache::new(64), TIMEOUT)
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn report(outcome: BatchOutcome) -> pano_loader::BatchReport {
    match outcome {
        BatchOutcome::Completed(report) => report,
        other => panic!("expected completed batch, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_waves_respect_budget(n in 2usize..=8, c in 1usize..=5) {
        let rt = paused_runtime();
        let provider =
            Arc::new(ScriptedProvider::new().with_default_delay(Duration::from_millis(10)));
        let loader = loader(&provider);
        let vps = ring(n);
        let order: Vec<usize> = (0..n).collect();

        let observer = RecordingObserver::new();
        let outcome = rt.block_on(loader.load_all(&vps, &order, &budget(c), &observer, || true));
        let report = report(outcome);

        prop_assert_eq!(report.waves, n.div_ceil(c));
        prop_assert_eq!(report.loaded.count(), n);
        prop_assert!(provider.max_outstanding() <= c);
        prop_assert_eq!(provider.total_fetch_calls(), n);
    }
}

#[tokio::test(start_paused = true)]
async fn test_wave_barrier_orders_requests() {
    // First request of each wave is slow so a missing barrier would show up
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_default_delay(Duration::from_millis(10))
            .with_image_delay(locator("lm", 0), Duration::from_millis(50))
            .with_image_delay(locator("lm", 90), Duration::from_millis(50)),
    );
    let loader = loader(&provider);
    let vps = ring(4);

    let outcome = loader
        .load_all(&vps, &[0, 1, 2, 3], &budget(2), &RecordingObserver::new(), || true)
        .await;
    assert_eq!(report(outcome).waves, 2);

    let events = provider.events();
    let position = |event: FetchEvent| events.iter().position(|e| *e == event).unwrap();
    let wave_one_done = position(FetchEvent::Finished(locator("lm", 0)))
        .max(position(FetchEvent::Finished(locator("lm", 45))));
    let wave_two_start = position(FetchEvent::Started(locator("lm", 90)))
        .min(position(FetchEvent::Started(locator("lm", 135))));
    assert!(wave_one_done < wave_two_start);
}

#[tokio::test(start_paused = true)]
async fn test_failure_does_not_abort_wave() {
    let provider = Arc::new(
        ScriptedProvider::new().with_image_failure(locator("lm", 45), ProviderError::NotFound),
    );
    let loader = loader(&provider);
    let vps = ring(4);
    let observer = RecordingObserver::new();

    let report = report(
        loader
            .load_all(&vps, &[0, 1, 2, 3], &budget(4), &observer, || true)
            .await,
    );

    assert_eq!(report.loaded.iter_set().collect::<Vec<_>>(), vec![0, 2, 3]);
    assert!(report.failed.is_set(1));
    assert_eq!(
        report.errors,
        vec![LoadError::ViewpointFailed {
            index: 1,
            source: ProviderError::NotFound,
        }]
    );
    assert!(!report.all_failed());
    assert!(observer.done().contains(&(1, false)));
    assert_eq!(
        observer.progress().last().map(|(p, _)| *p),
        Some(100)
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_viewpoint_times_out() {
    let provider = Arc::new(
        ScriptedProvider::new().with_image_delay(locator("lm", 0), Duration::from_secs(60)),
    );
    let loader = loader(&provider);
    let vps = ring(2);

    let report = report(
        loader
            .load_all(&vps, &[0, 1], &budget(2), &RecordingObserver::new(), || true)
            .await,
    );

    assert!(report.failed.is_set(0));
    assert!(report.loaded.is_set(1));
    assert!(matches!(
        report.errors.as_slice(),
        [LoadError::ViewpointFailed {
            index: 0,
            source: ProviderError::Timeout { after_ms: 10_000 },
        }]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_single_viewpoint_progress_steps() {
    let provider = Arc::new(ScriptedProvider::new());
    let loader = loader(&provider);
    let vps = ring(1);
    let observer = RecordingObserver::new();

    let report = report(
        loader
            .load_all(&vps, &[0], &budget(4), &observer, || true)
            .await,
    );

    assert!(report.loaded.is_set(0));
    assert_eq!(
        observer.progress(),
        vec![
            (25, LABEL_LOADING.to_string()),
            (75, LABEL_PROCESSING.to_string()),
            (90, LABEL_PREPARING.to_string()),
            (100, LABEL_READY.to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_offline_budget_makes_no_requests() {
    let provider = Arc::new(ScriptedProvider::new());
    let images = ImageCache::new(16);
    images
        .insert(LoadedImage {
            locator: locator("lm", 0),
            tier: QualityTier::Thumbnail,
            bytes: 1,
        })
        .await;
    let loader = BatchedLoader::new(provider.clone(), images, TIMEOUT);
    let vps = ring(3);
    let observer = RecordingObserver::new();

    let outcome = loader
        .load_all(&vps, &[0, 1, 2], &budget(0), &observer, || true)
        .await;

    let BatchOutcome::Offline(report) = outcome else {
        panic!("expected offline outcome");
    };
    assert_eq!(provider.total_fetch_calls(), 0);
    assert!(report.loaded.is_set(0));
    assert_eq!(report.failed.count(), 2);
    assert_eq!(observer.progress(), vec![(100, LABEL_CACHED.to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_supersession_stops_between_waves() {
    let provider = Arc::new(ScriptedProvider::new().with_default_delay(Duration::from_millis(10)));
    let loader = loader(&provider);
    let vps = ring(4);
    let observer = RecordingObserver::new();
    let active = Arc::new(AtomicBool::new(true));

    // Goes inactive during the second wave
    let flag = Arc::clone(&active);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        flag.store(false, Ordering::SeqCst);
    });

    let outcome = loader
        .load_all(&vps, &[0, 1, 2, 3], &budget(1), &observer, || {
            active.load(Ordering::SeqCst)
        })
        .await;

    assert!(matches!(
        outcome,
        BatchOutcome::Superseded { waves_completed: 2 }
    ));
    assert_eq!(provider.total_fetch_calls(), 2);
    // Settles observed after supersession are not reported
    assert_eq!(observer.done(), vec![(0, true)]);
}

#[tokio::test(start_paused = true)]
async fn test_cached_images_skip_the_provider() {
    let provider = Arc::new(ScriptedProvider::new());
    let loader = loader(&provider);
    let vps = ring(3);
    let order = [2, 0, 1];

    for _ in 0..2 {
        let report = report(
            loader
                .load_all(&vps, &order, &budget(2), &RecordingObserver::new(), || true)
                .await,
        );
        assert_eq!(report.loaded.count(), 3);
    }

    for vp in &vps {
        assert_eq!(provider.fetch_calls(vp.image_locator()), 1);
        assert!(loader.images().contains(vp.image_locator()));
    }
}

#[tokio::test]
async fn test_empty_and_out_of_range_order() {
    let provider = Arc::new(ScriptedProvider::new());
    let loader = loader(&provider);
    let vps = ring(2);
    let observer = RecordingObserver::new();

    let report = report(
        loader
            .load_all(&vps, &[7, 9], &budget(2), &observer, || true)
            .await,
    );
    assert_eq!(report.attempted, 0);
    assert_eq!(provider.total_fetch_calls(), 0);
    assert_eq!(observer.progress(), vec![(100, LABEL_READY.to_string())]);
}
