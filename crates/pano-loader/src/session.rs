//! Session-scoped load controller
//!
//! Guarantees at most one active load per viewing surface:
//! - a key already completed in this surface lifetime renders immediately
//! - a key equal to the in-flight key is a no-op
//! - any other key supersedes the current session and starts a new one
//!
//! Supersession is observed through [`SessionTicket::is_active`], a generation
//! comparison that late callbacks consult before touching shared state.

use crate::error::SessionError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use ulid::Ulid;

/// Landmark + viewpoint identity of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionKey {
    /// Landmark index in the current list
    pub landmark: usize,
    /// Viewpoint index within the landmark
    pub viewpoint: usize,
}

impl SessionKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(landmark: usize, viewpoint: usize) -> Self {
        Self { landmark, viewpoint }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.landmark, self.viewpoint)
    }
}

/// Unique session identifier (for log correlation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one load session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing loading
    Idle,
    /// Session opened, no request issued yet
    Starting,
    /// Requests outstanding
    InFlight,
    /// Finished while active
    Completed,
    /// Failed while active
    Failed,
    /// Replaced by a newer session or torn down
    Superseded,
}

impl SessionState {
    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }

    /// Whether the session still owns the surface's loading state
    #[inline]
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Starting | Self::InFlight)
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: SessionState) -> &'static [SessionState] {
    use SessionState::*;
    match from {
        Idle => &[Starting],
        Starting => &[InFlight, Completed, Failed, Superseded],
        InFlight => &[Completed, Failed, Superseded],
        Completed | Failed | Superseded => &[],
    }
}

/// Validate a session state transition
///
/// # Errors
/// `SessionError::IllegalTransition` when `to` is not reachable from `from`
pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), SessionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SessionError::IllegalTransition { from, to })
    }
}

/// Handle held by the code driving one session
#[derive(Debug, Clone)]
pub struct SessionTicket {
    id: SessionId,
    key: SessionKey,
    generation: u64,
    live: Arc<AtomicU64>,
}

impl SessionTicket {
    /// Session id
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Session key
    #[inline]
    #[must_use]
    pub fn key(&self) -> SessionKey {
        self.key
    }

    /// Whether no newer session has started and the controller is not torn down
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.live.load(Ordering::Acquire) == self.generation
    }
}

/// What [`LoadController::begin`] decided
#[derive(Debug, Clone)]
pub enum SessionDecision {
    /// Key completed earlier in this lifetime; render without loading
    AlreadyCompleted(SessionKey),
    /// Key is the one currently loading; nothing to do
    AlreadyInFlight(SessionKey),
    /// New session opened
    Started(SessionTicket),
}

/// Read-only view of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSession {
    /// Session id
    pub id: SessionId,
    /// Session key
    pub key: SessionKey,
    /// Lifecycle state
    pub state: SessionState,
    /// Viewpoints of the landmark loaded by this session
    pub completed_viewpoints: BTreeSet<usize>,
}

/// Controller statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControllerStats {
    /// Sessions opened
    pub started: usize,
    /// Sessions completed
    pub completed: usize,
    /// Sessions failed
    pub failed: usize,
    /// Sessions superseded
    pub superseded: usize,
    /// Key changes answered from the completed set
    pub deduplicated: usize,
}

#[derive(Debug)]
struct ActiveSession {
    session: LoadSession,
    generation: u64,
}

#[derive(Debug, Default)]
struct ControllerInner {
    current: Option<ActiveSession>,
    completed: HashSet<SessionKey>,
    stats: ControllerStats,
}

impl ControllerInner {
    fn transition(&mut self, to: SessionState) -> bool {
        let Some(active) = self.current.as_mut() else {
            return false;
        };
        let from = active.session.state;
        if let Err(error) = validate_transition(from, to) {
            tracing::warn!(%error, session = %active.session.id, "rejected session transition");
            return false;
        }
        active.session.state = to;
        match to {
            SessionState::Completed => self.stats.completed += 1,
            SessionState::Failed => self.stats.failed += 1,
            SessionState::Superseded => self.stats.superseded += 1,
            _ => {}
        }
        true
    }

    fn supersede_pending(&mut self) {
        let pending = self
            .current
            .as_ref()
            .is_some_and(|active| active.session.state.is_pending());
        if pending && self.transition(SessionState::Superseded) {
            if let Some(active) = &self.current {
                tracing::debug!(
                    session = %active.session.id,
                    key = %active.session.key,
                    "session superseded"
                );
            }
        }
    }

    fn owns(&self, ticket: &SessionTicket) -> bool {
        ticket.is_active()
            && self
                .current
                .as_ref()
                .is_some_and(|active| active.generation == ticket.generation)
    }
}

/// Session-scoped load controller
///
/// Owns the completed-key set and the in-flight pointer; no other component
/// mutates them.
#[derive(Debug, Default)]
pub struct LoadController {
    live: Arc<AtomicU64>,
    inner: Mutex<ControllerInner>,
}

impl LoadController {
    /// Create controller
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a landmark/viewpoint change
    pub fn begin(&self, key: SessionKey) -> SessionDecision {
        let mut inner = self.inner.lock();

        if inner.completed.contains(&key) {
            // Late callbacks of a pending session must not touch the completed view
            inner.supersede_pending();
            self.live.fetch_add(1, Ordering::AcqRel);
            inner.current = None;
            inner.stats.deduplicated += 1;
            tracing::debug!(%key, "key already completed, rendering from memory");
            return SessionDecision::AlreadyCompleted(key);
        }

        if let Some(active) = &inner.current {
            if active.session.key == key && active.session.state.is_pending() {
                return SessionDecision::AlreadyInFlight(key);
            }
        }

        inner.supersede_pending();
        let generation = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        let id = SessionId::new();
        inner.current = Some(ActiveSession {
            session: LoadSession {
                id,
                key,
                state: SessionState::Idle,
                completed_viewpoints: BTreeSet::new(),
            },
            generation,
        });
        inner.transition(SessionState::Starting);
        inner.stats.started += 1;
        tracing::debug!(session = %id, %key, "session started");

        SessionDecision::Started(SessionTicket {
            id,
            key,
            generation,
            live: Arc::clone(&self.live),
        })
    }

    /// Starting → InFlight; returns `false` for an inactive ticket
    pub fn mark_in_flight(&self, ticket: &SessionTicket) -> bool {
        let mut inner = self.inner.lock();
        inner.owns(ticket) && inner.transition(SessionState::InFlight)
    }

    /// Record one loaded viewpoint of the session's landmark
    pub fn record_viewpoint(&self, ticket: &SessionTicket, viewpoint: usize) -> bool {
        let mut inner = self.inner.lock();
        if !inner.owns(ticket) {
            return false;
        }
        if let Some(active) = inner.current.as_mut() {
            active.session.completed_viewpoints.insert(viewpoint);
        }
        true
    }

    /// Resolve as Completed; loaded viewpoints join the completed set
    ///
    /// Returns `false` when the ticket was superseded; nothing is recorded then.
    pub fn complete(&self, ticket: &SessionTicket) -> bool {
        let mut inner = self.inner.lock();
        if !inner.owns(ticket) || !inner.transition(SessionState::Completed) {
            return false;
        }
        let landmark = ticket.key.landmark;
        let loaded: Vec<usize> = inner
            .current
            .as_ref()
            .map(|active| active.session.completed_viewpoints.iter().copied().collect())
            .unwrap_or_default();
        for viewpoint in loaded {
            inner.completed.insert(SessionKey::new(landmark, viewpoint));
        }
        tracing::debug!(session = %ticket.id, key = %ticket.key, "session completed");
        true
    }

    /// Resolve as Failed; nothing joins the completed set
    pub fn fail(&self, ticket: &SessionTicket) -> bool {
        let mut inner = self.inner.lock();
        let applied = inner.owns(ticket) && inner.transition(SessionState::Failed);
        if applied {
            tracing::debug!(session = %ticket.id, key = %ticket.key, "session failed");
        }
        applied
    }

    /// Supersede everything and forget completed keys
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        inner.supersede_pending();
        self.live.fetch_add(1, Ordering::AcqRel);
        inner.current = None;
        inner.completed.clear();
        tracing::debug!("load controller torn down");
    }

    /// Forget completed keys without touching the current session
    ///
    /// Keys are positional; call this when the landmark list is reordered.
    pub fn forget_completed(&self) {
        self.inner.lock().completed.clear();
    }

    /// Whether a key completed in this lifetime
    #[inline]
    #[must_use]
    pub fn is_completed(&self, key: SessionKey) -> bool {
        self.inner.lock().completed.contains(&key)
    }

    /// Current session, if any
    #[must_use]
    pub fn current(&self) -> Option<LoadSession> {
        self.inner
            .lock()
            .current
            .as_ref()
            .map(|active| active.session.clone())
    }

    /// Get controller statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ControllerStats {
        self.inner.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(decision: SessionDecision) -> SessionTicket {
        match decision {
            SessionDecision::Started(ticket) => ticket,
            other => panic!("expected a started session, got {other:?}"),
        }
    }

    #[test]
    fn transition_table() {
        assert!(validate_transition(SessionState::Idle, SessionState::Starting).is_ok());
        assert!(validate_transition(SessionState::Starting, SessionState::InFlight).is_ok());
        assert!(validate_transition(SessionState::InFlight, SessionState::Completed).is_ok());
        assert!(validate_transition(SessionState::Idle, SessionState::Completed).is_err());
        assert!(validate_transition(SessionState::Completed, SessionState::Superseded).is_err());
        assert!(SessionState::Superseded.is_terminal());
        assert!(!SessionState::InFlight.is_terminal());
    }

    #[test]
    fn completed_key_renders_immediately() {
        let controller = LoadController::new();
        let ticket = started(controller.begin(SessionKey::new(0, 0)));
        assert!(controller.mark_in_flight(&ticket));
        assert!(controller.record_viewpoint(&ticket, 0));
        assert!(controller.record_viewpoint(&ticket, 2));
        assert!(controller.complete(&ticket));

        assert!(matches!(
            controller.begin(SessionKey::new(0, 0)),
            SessionDecision::AlreadyCompleted(_)
        ));
        assert!(controller.is_completed(SessionKey::new(0, 2)));
        assert!(!controller.is_completed(SessionKey::new(0, 1)));
        assert_eq!(controller.stats().deduplicated, 1);
    }

    #[test]
    fn same_key_in_flight_is_noop() {
        let controller = LoadController::new();
        let ticket = started(controller.begin(SessionKey::new(1, 0)));
        controller.mark_in_flight(&ticket);

        assert!(matches!(
            controller.begin(SessionKey::new(1, 0)),
            SessionDecision::AlreadyInFlight(_)
        ));
        assert!(ticket.is_active());
    }

    #[test]
    fn new_key_supersedes_pending_session() {
        let controller = LoadController::new();
        let first = started(controller.begin(SessionKey::new(0, 0)));
        controller.mark_in_flight(&first);
        controller.record_viewpoint(&first, 0);

        let second = started(controller.begin(SessionKey::new(1, 0)));
        assert!(!first.is_active());
        assert!(second.is_active());

        // Late completion of the first session is discarded
        assert!(!controller.complete(&first));
        assert!(!controller.is_completed(SessionKey::new(0, 0)));
        assert_eq!(controller.stats().superseded, 1);
        assert_eq!(controller.current().map(|s| s.key), Some(SessionKey::new(1, 0)));
    }

    #[test]
    fn failure_allows_retry() {
        let controller = LoadController::new();
        let ticket = started(controller.begin(SessionKey::new(0, 0)));
        controller.mark_in_flight(&ticket);
        assert!(controller.fail(&ticket));

        assert_eq!(
            controller.current().map(|s| s.state),
            Some(SessionState::Failed)
        );
        assert!(matches!(
            controller.begin(SessionKey::new(0, 0)),
            SessionDecision::Started(_)
        ));
    }

    #[test]
    fn completed_key_supersedes_pending_session() {
        let controller = LoadController::new();
        let a = started(controller.begin(SessionKey::new(0, 0)));
        controller.record_viewpoint(&a, 0);
        controller.complete(&a);

        let b = started(controller.begin(SessionKey::new(1, 0)));
        controller.mark_in_flight(&b);

        assert!(matches!(
            controller.begin(SessionKey::new(0, 0)),
            SessionDecision::AlreadyCompleted(_)
        ));
        assert!(!b.is_active());
        assert!(controller.current().is_none());
    }

    #[test]
    fn teardown_discards_everything() {
        let controller = LoadController::new();
        let a = started(controller.begin(SessionKey::new(0, 0)));
        controller.record_viewpoint(&a, 0);
        controller.complete(&a);
        let b = started(controller.begin(SessionKey::new(1, 0)));

        controller.teardown();

        assert!(!b.is_active());
        assert!(!controller.is_completed(SessionKey::new(0, 0)));
        assert!(controller.current().is_none());
        assert!(!controller.complete(&b));
    }
}
