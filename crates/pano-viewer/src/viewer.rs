//! The street-level viewing surface
//!
//! [`StreetViewer`] wires the navigator, load controller and batched loader
//! together behind a command API and publishes a [`ViewerSnapshot`] after
//! every change.
//!
//! All surface state sits behind one lock. Load tasks take that lock and
//! check their session ticket before touching anything, so a superseded
//! session can never mutate navigation or progress.

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::state::{Availability, LoadingState, ViewerSnapshot};
use pano_loader::{
    BatchOutcome, BatchReport, BatchedLoader, CacheStats, ConcurrencyPolicy, ControllerStats,
    ImageCache, ImageProvider, LoadBudget, LoadController, LoadError, LoadObserver,
    LocationCallback, NetworkQuality, NetworkStatus, NoopObserver, OfflineCache, ProviderError,
    SessionDecision, SessionKey, SessionState, SessionTicket, UnavailableCause,
    ViewpointSetCache, LABEL_READY,
};
use pano_navigator::{
    layout, resolve, BindingContext, CompassDial, DialGeometry, KeyStroke, NavEvent, Navigator,
    ThumbnailGrid,
};
use pano_viewpoint::{
    classify_with, load_order, GeoCoordinate, Landmark, LandmarkId, ViewpointSet,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

/// External collaborators of the viewer
#[derive(Clone)]
pub struct Collaborators {
    /// Imagery service
    pub provider: Arc<dyn ImageProvider>,
    /// Network-status reading
    pub network: Arc<dyn NetworkStatus>,
    /// Offline payload store
    pub offline: Arc<dyn OfflineCache>,
    /// "Show on map" callback; the M key is live only when set
    pub on_location: Option<LocationCallback>,
}

impl Collaborators {
    /// Collaborators with an in-memory offline cache and no map callback
    #[must_use]
    pub fn new(provider: Arc<dyn ImageProvider>, network: Arc<dyn NetworkStatus>) -> Self {
        Self {
            provider,
            network,
            offline: Arc::new(ViewpointSetCache::default()),
            on_location: None,
        }
    }

    /// With offline cache
    #[must_use]
    pub fn with_offline_cache(mut self, offline: Arc<dyn OfflineCache>) -> Self {
        self.offline = offline;
        self
    }

    /// With location callback
    #[must_use]
    pub fn with_location_callback(mut self, callback: LocationCallback) -> Self {
        self.on_location = Some(callback);
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("on_location", &self.on_location.is_some())
            .finish_non_exhaustive()
    }
}

/// Per-surface state, alive between open and close
#[derive(Debug)]
struct Surface {
    landmarks: Vec<Landmark>,
    navigator: Navigator,
    resolved: HashMap<LandmarkId, Arc<ViewpointSet>>,
}

impl Surface {
    fn landmark(&self) -> &Landmark {
        &self.landmarks[self.navigator.state().landmark_index]
    }

    fn current_key(&self) -> SessionKey {
        let state = self.navigator.state();
        SessionKey::new(state.landmark_index, state.viewpoint_index)
    }

    fn active_coordinate(&self) -> GeoCoordinate {
        let landmark = self.landmark();
        self.resolved
            .get(&landmark.id)
            .and_then(|set| set.get(self.navigator.state().viewpoint_index))
            .map_or(landmark.coordinate, |vp| vp.coordinate())
    }
}

struct ViewerInner {
    config: ViewerConfig,
    collaborators: Collaborators,
    policy: ConcurrencyPolicy,
    loader: BatchedLoader,
    controller: LoadController,
    surface: Mutex<Option<Surface>>,
    state: watch::Sender<ViewerSnapshot>,
    runtime: Handle,
}

/// Street-level viewing surface
///
/// Commands are synchronous; loads run as tasks on the runtime the viewer
/// was created on. Subscribe to observe progress.
pub struct StreetViewer {
    inner: Arc<ViewerInner>,
}

impl std::fmt::Debug for StreetViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreetViewer")
            .field("config", &self.inner.config)
            .field("collaborators", &self.inner.collaborators)
            .finish_non_exhaustive()
    }
}

impl StreetViewer {
    /// Create a closed viewer on the current tokio runtime
    ///
    /// # Errors
    /// - `ViewerError::Config` when the configuration is out of range
    /// - `ViewerError::NoRuntime` outside a tokio runtime
    pub fn new(config: ViewerConfig, collaborators: Collaborators) -> Result<Self, ViewerError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ViewerError::NoRuntime)?;
        let loader = BatchedLoader::new(
            Arc::clone(&collaborators.provider),
            ImageCache::new(config.loader.image_cache_capacity),
            config.loader.viewpoint_timeout(),
        );
        let policy = ConcurrencyPolicy::new(config.loader.policy.clone());
        let (state, _) = watch::channel(ViewerSnapshot::default());

        Ok(Self {
            inner: Arc::new(ViewerInner {
                config,
                collaborators,
                policy,
                loader,
                controller: LoadController::new(),
                surface: Mutex::new(None),
                state,
                runtime,
            }),
        })
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewerSnapshot> {
        self.inner.state.subscribe()
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Open on `initial` of `landmarks`
    ///
    /// Reopening with the same landmark list keeps completed loads.
    ///
    /// # Errors
    /// `NoLandmarks` or `LandmarkOutOfRange`
    pub fn open_session(
        &self,
        landmarks: Vec<Landmark>,
        initial: usize,
    ) -> Result<(), ViewerError> {
        self.inner.open(landmarks, initial)
    }

    /// Next landmark (wraps)
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn next(&self) -> Result<(), ViewerError> {
        self.inner.command(|nav| nav.step_landmark(1)).map(drop)
    }

    /// Previous landmark (wraps)
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn previous(&self) -> Result<(), ViewerError> {
        self.inner.command(|nav| nav.step_landmark(-1)).map(drop)
    }

    /// Select a viewpoint of the active landmark (clamped)
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn select_viewpoint(&self, index: usize) -> Result<(), ViewerError> {
        self.inner.command(|nav| nav.select_index(index)).map(drop)
    }

    /// Select a landmark
    ///
    /// # Errors
    /// `SurfaceClosed` or `LandmarkOutOfRange`
    pub fn select_landmark(&self, index: usize) -> Result<(), ViewerError> {
        let mut out_of_range = None;
        self.inner.command(|nav| {
            if index >= nav.landmark_count() {
                out_of_range = Some(nav.landmark_count());
                return NavEvent::Unchanged;
            }
            nav.select_landmark(index)
        })?;
        match out_of_range {
            Some(len) => Err(ViewerError::LandmarkOutOfRange { index, len }),
            None => Ok(()),
        }
    }

    /// Dispatch a key press through the binding table
    ///
    /// Returns whether the platform default must be suppressed.
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn handle_key(&self, stroke: KeyStroke) -> Result<bool, ViewerError> {
        let map_available = self.inner.collaborators.on_location.is_some();
        let mut prevent_default = false;
        self.inner.command(|nav| {
            let ctx = BindingContext {
                viewpoint_count: nav.viewpoint_count(),
                map_available,
            };
            match resolve(stroke, &ctx) {
                Some(resolved) => {
                    prevent_default = resolved.prevent_default;
                    nav.apply(resolved.command)
                }
                None => NavEvent::Unchanged,
            }
        })?;
        Ok(prevent_default)
    }

    /// Retry a failed landmark or failed viewpoints
    ///
    /// Returns whether anything was retried.
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn retry(&self) -> Result<bool, ViewerError> {
        self.inner.retry()
    }

    /// Replace the landmark list, following the active landmark by id
    ///
    /// # Errors
    /// `SurfaceClosed` or `NoLandmarks`
    pub fn replace_landmarks(&self, landmarks: Vec<Landmark>) -> Result<(), ViewerError> {
        self.inner.replace_landmarks(landmarks)
    }

    /// Close the surface; pending work is discarded
    ///
    /// # Errors
    /// `SurfaceClosed` when already closed
    pub fn close(&self) -> Result<(), ViewerError> {
        let mut guard = self.inner.surface.lock();
        if guard.is_none() {
            return Err(ViewerError::SurfaceClosed);
        }
        self.inner.close_locked(&mut guard);
        Ok(())
    }

    /// Thumbnail grid for the landmark list
    ///
    /// # Errors
    /// `SurfaceClosed`
    pub fn thumbnails(&self) -> Result<ThumbnailGrid, ViewerError> {
        let guard = self.inner.surface.lock();
        let surface = guard.as_ref().ok_or(ViewerError::SurfaceClosed)?;
        Ok(ThumbnailGrid::new(
            &surface.landmarks,
            surface.navigator.state().landmark_index,
            self.inner.config.thumbnail_cap,
        ))
    }

    /// Compass dial for the active landmark; `None` when hidden
    #[must_use]
    pub fn compass(&self, geometry: &DialGeometry) -> Option<CompassDial> {
        let snapshot = self.inner.state.borrow();
        let set = snapshot.viewpoints.as_deref()?;
        layout(set.viewpoints(), snapshot.navigator.viewpoint_index, geometry)
    }

    /// Load controller statistics
    #[must_use]
    pub fn controller_stats(&self) -> ControllerStats {
        self.inner.controller.stats()
    }

    /// Image cache statistics
    #[must_use]
    pub fn image_cache_stats(&self) -> CacheStats {
        self.inner.loader.images().stats()
    }
}

impl Drop for StreetViewer {
    fn drop(&mut self) {
        self.inner.controller.teardown();
    }
}

impl ViewerInner {
    fn publish(&self, surface: &Surface, update: impl FnOnce(&mut ViewerSnapshot)) {
        let session = self.controller.current();
        let navigator = surface.navigator.state();
        self.state.send_modify(|snapshot| {
            update(snapshot);
            snapshot.is_open = true;
            snapshot.navigator = navigator;
            snapshot.session = session;
        });
    }

    fn open(self: &Arc<Self>, landmarks: Vec<Landmark>, initial: usize) -> Result<(), ViewerError> {
        let navigator = Navigator::new(landmarks.len(), initial)?;
        let mut guard = self.surface.lock();

        let same_list = guard.as_ref().is_some_and(|s| {
            s.landmarks.len() == landmarks.len()
                && s.landmarks.iter().zip(&landmarks).all(|(a, b)| a.id == b.id)
        });
        let resolved = if same_list {
            guard.take().map(|s| s.resolved).unwrap_or_default()
        } else {
            self.controller.teardown();
            HashMap::new()
        };

        let surface = guard.insert(Surface {
            landmarks,
            navigator,
            resolved,
        });
        let landmark = surface.landmark().clone();
        tracing::info!(
            landmark = %landmark.id,
            count = surface.landmarks.len(),
            reopened = same_list,
            "opening viewer"
        );
        self.publish(surface, |s| {
            *s = ViewerSnapshot::default();
            s.clear_landmark(Some(landmark));
        });
        let key = surface.current_key();
        self.begin_load(surface, key);
        Ok(())
    }

    fn command(
        self: &Arc<Self>,
        f: impl FnOnce(&mut Navigator) -> NavEvent,
    ) -> Result<NavEvent, ViewerError> {
        let mut guard = self.surface.lock();
        let surface = guard.as_mut().ok_or(ViewerError::SurfaceClosed)?;
        let event = f(&mut surface.navigator);

        let mut map_target = None;
        match event {
            NavEvent::CloseRequested => self.close_locked(&mut guard),
            NavEvent::ShowOnMap => map_target = Some(surface.active_coordinate()),
            other => self.on_event(surface, other),
        }
        drop(guard);

        if let (Some(coordinate), Some(callback)) = (map_target, &self.collaborators.on_location) {
            tracing::debug!(%coordinate, "show on map");
            callback(coordinate);
        }
        Ok(event)
    }

    fn on_event(self: &Arc<Self>, surface: &mut Surface, event: NavEvent) {
        match event {
            NavEvent::Unchanged | NavEvent::ShowOnMap | NavEvent::CloseRequested => {}
            NavEvent::DisplayChanged => self.publish(surface, |_| {}),
            NavEvent::LandmarkChanged { from, to } => {
                let landmark = surface.landmark().clone();
                tracing::debug!(from, to, landmark = %landmark.id, "landmark changed");
                self.publish(surface, |s| s.clear_landmark(Some(landmark)));
                let key = surface.current_key();
                self.begin_load(surface, key);
            }
            NavEvent::ViewpointChanged { from, to } => {
                tracing::debug!(from, to, "viewpoint changed");
                let key = surface.current_key();
                self.begin_load(surface, key);
            }
        }
    }

    fn close_locked(&self, guard: &mut Option<Surface>) {
        self.controller.teardown();
        *guard = None;
        self.state.send_replace(ViewerSnapshot::default());
        tracing::info!("viewer closed");
    }

    fn known_set(&self, surface: &Surface, id: &LandmarkId) -> Option<Arc<ViewpointSet>> {
        surface
            .resolved
            .get(id)
            .cloned()
            .or_else(|| self.collaborators.offline.lookup(id))
    }

    /// Install a payload for the active landmark
    fn install(&self, surface: &mut Surface, set: &Arc<ViewpointSet>) {
        let id = surface.landmark().id.clone();
        surface.resolved.insert(id, Arc::clone(set));
        surface.navigator.set_viewpoint_count(set.len());

        let strategy = classify_with(set, &self.config.loader.thresholds);
        let len = set.len();
        self.publish(surface, |s| {
            s.viewpoints = Some(Arc::clone(set));
            s.strategy = Some(strategy);
            s.availability = Availability::Ready;
            if s.failed_viewpoints.len() != len {
                s.failed_viewpoints.reset(len);
            }
            if s.loading.per_viewpoint_loading.len() != len {
                s.loading.per_viewpoint_loading.reset(len);
            }
        });
    }

    fn begin_load(self: &Arc<Self>, surface: &mut Surface, key: SessionKey) {
        let landmark = surface.landmark().clone();
        let known = self.known_set(surface, &landmark.id);

        let ticket = match self.controller.begin(key) {
            SessionDecision::AlreadyInFlight(_) => {
                // The running session keeps going; a reopened surface needs its view back
                let len = known.as_ref().map_or(0, |set| set.len());
                self.publish(surface, |s| {
                    if !s.loading.is_loading {
                        s.loading = LoadingState::started(len);
                    }
                });
                if let Some(set) = &known {
                    self.install(surface, set);
                }
                return;
            }
            SessionDecision::AlreadyCompleted(_) => {
                let mut failed = Vec::new();
                match &known {
                    Some(set) => {
                        self.install(surface, set);
                        // Viewpoints that never loaded stay retry-eligible placeholders
                        failed.extend((0..set.len()).filter(|i| {
                            !self.controller.is_completed(SessionKey::new(key.landmark, *i))
                        }));
                    }
                    None => {
                        tracing::warn!(
                            landmark = %landmark.id,
                            "completed landmark has no payload"
                        );
                    }
                }
                self.publish(surface, |s| {
                    s.loading.is_loading = false;
                    s.loading.progress_percent = 100;
                    s.loading.step_label = LABEL_READY.to_string();
                    s.loading.per_viewpoint_loading.clear_all();
                    s.failed_viewpoints.clear_all();
                    for index in failed {
                        s.failed_viewpoints.set(index);
                    }
                });
                return;
            }
            SessionDecision::Started(ticket) => ticket,
        };

        let budget = self
            .policy
            .evaluate(self.collaborators.network.snapshot().as_ref(), Instant::now());
        if budget.is_offline() {
            self.load_offline(surface, &ticket, known);
            return;
        }

        self.controller.mark_in_flight(&ticket);
        let len = known.as_ref().map_or(0, |set| set.len());
        self.publish(surface, |s| s.loading = LoadingState::started(len));
        if let Some(set) = &known {
            self.install(surface, set);
        }
        tracing::debug!(
            session = %ticket.id(),
            %key,
            landmark = %landmark.id,
            concurrent = budget.concurrent_loads,
            "load session started"
        );

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.run_session(ticket, landmark, budget, known).await;
        });
    }

    /// Zero budget: answer from caches within the calling command
    fn load_offline(
        &self,
        surface: &mut Surface,
        ticket: &SessionTicket,
        known: Option<Arc<ViewpointSet>>,
    ) {
        let Some(set) = known else {
            tracing::info!(landmark = %surface.landmark().id, "offline with nothing cached");
            self.controller.fail(ticket);
            self.publish(surface, |s| {
                s.loading = LoadingState::default();
                s.availability = Availability::Unavailable(UnavailableCause::Offline);
            });
            return;
        };

        self.publish(surface, |s| s.loading = LoadingState::started(set.len()));
        self.install(surface, &set);
        let order = self.load_order_for(ticket.key(), &set);
        let report = self.loader.load_cached(set.viewpoints(), &order, &NoopObserver);
        self.settle(surface, ticket, &report, false);
    }

    /// Selected viewpoint first, then the rest not yet completed
    fn load_order_for(&self, key: SessionKey, set: &ViewpointSet) -> Vec<usize> {
        let selected = key.viewpoint.min(set.len().saturating_sub(1));
        std::iter::once(selected)
            .chain(load_order(set).into_iter().filter(|i| {
                *i != selected && !self.controller.is_completed(SessionKey::new(key.landmark, *i))
            }))
            .collect()
    }

    /// Fold a batch report into the controller and the snapshot
    ///
    /// Returns whether the session completed.
    fn settle(
        &self,
        surface: &Surface,
        ticket: &SessionTicket,
        report: &BatchReport,
        hold: bool,
    ) -> bool {
        for index in report.loaded.iter_set() {
            self.controller.record_viewpoint(ticket, index);
        }
        let completed = !report.all_failed();
        if completed {
            self.controller.complete(ticket);
        } else {
            self.controller.fail(ticket);
        }
        tracing::debug!(
            session = %ticket.id(),
            loaded = report.loaded.count(),
            failed = report.failed.count(),
            waves = report.waves,
            completed,
            "load session settled"
        );

        self.publish(surface, |s| {
            for index in report.loaded.iter_set() {
                s.failed_viewpoints.clear(index);
            }
            for index in report.failed.iter_set() {
                s.failed_viewpoints.set(index);
            }
            s.loading.per_viewpoint_loading.clear_all();
            s.loading.is_loading = completed && hold;
            if completed {
                s.loading.progress_percent = 100;
                s.loading.step_label = LABEL_READY.to_string();
            }
        });
        completed
    }

    async fn resolve(
        &self,
        landmark: &Landmark,
        quality: NetworkQuality,
    ) -> Result<Arc<ViewpointSet>, ProviderError> {
        let headings = self.policy.plan_headings(quality, landmark.facing_or_north());
        let timeout = self.config.loader.viewpoint_timeout();
        let resolving = self.collaborators.provider.resolve(landmark, &headings);
        let set = tokio::time::timeout(timeout, resolving)
            .await
            .map_err(|_| ProviderError::Timeout {
                after_ms: self.config.loader.viewpoint_timeout_ms,
            })??;
        let set = Arc::new(set);
        self.collaborators
            .offline
            .store(landmark.id.clone(), Arc::clone(&set));
        Ok(set)
    }

    async fn run_session(
        self: Arc<Self>,
        ticket: SessionTicket,
        landmark: Landmark,
        budget: LoadBudget,
        known: Option<Arc<ViewpointSet>>,
    ) {
        let set = match known {
            Some(set) => set,
            None => match self.resolve(&landmark, budget.quality).await {
                Ok(set) => set,
                Err(error) => {
                    self.mark_unavailable(&ticket, &landmark, &error);
                    return;
                }
            },
        };

        let order = {
            let mut guard = self.surface.lock();
            let Some(surface) = guard.as_mut() else {
                return;
            };
            if !ticket.is_active() {
                tracing::debug!(session = %ticket.id(), "superseded before loading");
                return;
            }
            self.install(surface, &set);
            self.load_order_for(ticket.key(), &set)
        };

        let observer = SessionObserver {
            inner: &self,
            ticket: &ticket,
        };
        let outcome = self
            .loader
            .load_all(set.viewpoints(), &order, &budget, &observer, || ticket.is_active())
            .await;

        let report = match outcome {
            BatchOutcome::Completed(report) | BatchOutcome::Offline(report) => report,
            BatchOutcome::Superseded { waves_completed } => {
                tracing::debug!(
                    session = %ticket.id(),
                    waves_completed,
                    error = %LoadError::SessionSuperseded,
                    "discarding load"
                );
                return;
            }
        };

        let completed = {
            let guard = self.surface.lock();
            let Some(surface) = guard.as_ref() else {
                tracing::debug!(
                    session = %ticket.id(),
                    error = %LoadError::Cancelled,
                    "discarding load"
                );
                return;
            };
            if !ticket.is_active() {
                return;
            }
            self.settle(surface, &ticket, &report, true)
        };

        if completed {
            tokio::time::sleep(self.config.loader.flicker_hold()).await;
            self.update_if_active(&ticket, |s| s.loading.is_loading = false);
        }
    }

    fn mark_unavailable(&self, ticket: &SessionTicket, landmark: &Landmark, error: &ProviderError) {
        let error = LoadError::from_resolve(error);
        tracing::warn!(landmark = %landmark.id, %error, "landmark unavailable");
        let cause = match error {
            LoadError::ProviderUnavailable(cause) => cause,
            _ => UnavailableCause::NoData,
        };

        let guard = self.surface.lock();
        let Some(surface) = guard.as_ref() else {
            return;
        };
        if ticket.is_active() && self.controller.fail(ticket) {
            self.publish(surface, |s| {
                s.loading = LoadingState::default();
                s.availability = Availability::Unavailable(cause);
            });
        }
    }

    fn update_if_active(&self, ticket: &SessionTicket, update: impl FnOnce(&mut ViewerSnapshot)) {
        let guard = self.surface.lock();
        let Some(surface) = guard.as_ref() else {
            return;
        };
        if ticket.is_active() {
            self.publish(surface, update);
        }
    }

    fn retry(self: &Arc<Self>) -> Result<bool, ViewerError> {
        let mut guard = self.surface.lock();
        let surface = guard.as_mut().ok_or(ViewerError::SurfaceClosed)?;

        let (availability, first_failed) = {
            let snapshot = self.state.borrow();
            let first = snapshot.failed_viewpoints.iter_set().next();
            (snapshot.availability, first)
        };
        let session_failed = self
            .controller
            .current()
            .is_some_and(|session| session.state == SessionState::Failed);

        let current = surface.current_key();
        let key = match (availability, first_failed) {
            (Availability::Unavailable(_), _) => current,
            (_, Some(index)) => SessionKey::new(current.landmark, index),
            _ if session_failed => current,
            _ => return Ok(false),
        };

        tracing::info!(%key, "retrying");
        if matches!(availability, Availability::Unavailable(_)) {
            self.publish(surface, |s| s.availability = Availability::Unknown);
        }
        self.begin_load(surface, key);
        Ok(true)
    }

    fn replace_landmarks(self: &Arc<Self>, landmarks: Vec<Landmark>) -> Result<(), ViewerError> {
        if landmarks.is_empty() {
            return Err(ViewerError::NoLandmarks);
        }
        let mut guard = self.surface.lock();
        let surface = guard.as_mut().ok_or(ViewerError::SurfaceClosed)?;

        let current = surface.landmark().id.clone();
        let follow = landmarks.iter().position(|l| l.id == current);
        let count = landmarks.len();
        surface.landmarks = landmarks;
        let event = surface.navigator.replace_landmarks(count, follow)?;

        // Session keys are positional
        self.controller.forget_completed();
        tracing::info!(count, followed = follow.is_some(), "landmark list replaced");

        match event {
            NavEvent::Unchanged => self.publish(surface, |_| {}),
            other => self.on_event(surface, other),
        }
        Ok(())
    }
}

/// Routes loader callbacks into the snapshot while the session is active
struct SessionObserver<'a> {
    inner: &'a ViewerInner,
    ticket: &'a SessionTicket,
}

impl LoadObserver for SessionObserver<'_> {
    fn on_progress(&self, percent: u8, label: &str) {
        self.inner.update_if_active(self.ticket, |s| {
            s.loading.progress_percent = percent;
            s.loading.step_label = label.to_string();
        });
    }

    fn on_viewpoint_start(&self, index: usize) {
        self.inner.update_if_active(self.ticket, |s| {
            s.loading.per_viewpoint_loading.set(index);
        });
    }

    fn on_viewpoint_done(&self, index: usize, loaded: bool) {
        self.inner.update_if_active(self.ticket, |s| {
            s.loading.per_viewpoint_loading.clear(index);
            s.failed_viewpoints.assign(index, !loaded);
        });
    }
}
