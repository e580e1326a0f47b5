use pano_loader::session::{allowed_transitions, validate_transition};
use pano_loader::{LoadController, SessionDecision, SessionKey, SessionState, SessionTicket};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn any_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        Just(SessionState::Starting),
        Just(SessionState::InFlight),
        Just(SessionState::Completed),
        Just(SessionState::Failed),
        Just(SessionState::Superseded),
    ]
}

#[test]
fn test_starting_transitions() {
    assert!(validate_transition(SessionState::Starting, SessionState::InFlight).is_ok());
    // Offline short-circuit resolves without going in flight
    assert!(validate_transition(SessionState::Starting, SessionState::Completed).is_ok());
    assert!(validate_transition(SessionState::Starting, SessionState::Superseded).is_ok());

    assert!(validate_transition(SessionState::Starting, SessionState::Idle).is_err());
}

#[test]
fn test_terminal_states_have_no_exits() {
    for state in [
        SessionState::Completed,
        SessionState::Failed,
        SessionState::Superseded,
    ] {
        assert!(state.is_terminal());
        assert!(allowed_transitions(state).is_empty());
    }
}

proptest! {
    #[test]
    fn prop_transitions_match_table(from in any_state(), to in any_state()) {
        let allowed = allowed_transitions(from);
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed.contains(&to));
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    LeavePending,
    Complete,
    Fail,
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::LeavePending),
        Just(Action::Complete),
        Just(Action::Fail),
    ]
}

proptest! {
    /// Replays random navigation against a small model of the controller
    #[test]
    fn prop_controller_matches_model(
        ops in prop::collection::vec((0usize..3, 0usize..3, any_action()), 1..40)
    ) {
        let controller = LoadController::new();
        let mut completed: HashSet<SessionKey> = HashSet::new();
        let mut pending: Option<SessionKey> = None;
        let mut tickets: Vec<SessionTicket> = Vec::new();

        for (landmark, viewpoint, action) in ops {
            let key = SessionKey::new(landmark, viewpoint);
            match controller.begin(key) {
                SessionDecision::AlreadyCompleted(k) => {
                    prop_assert!(completed.contains(&k));
                    pending = None;
                }
                SessionDecision::AlreadyInFlight(k) => {
                    prop_assert!(!completed.contains(&k));
                    prop_assert_eq!(pending, Some(k));
                }
                SessionDecision::Started(ticket) => {
                    prop_assert!(!completed.contains(&key));
                    prop_assert_ne!(pending, Some(key));
                    prop_assert!(controller.mark_in_flight(&ticket));
                    match action {
                        Action::LeavePending => pending = Some(key),
                        Action::Complete => {
                            prop_assert!(controller.record_viewpoint(&ticket, viewpoint));
                            prop_assert!(controller.complete(&ticket));
                            completed.insert(key);
                            pending = None;
                        }
                        Action::Fail => {
                            prop_assert!(controller.fail(&ticket));
                            pending = None;
                        }
                    }
                    tickets.push(ticket);
                }
            }

            // At most one session is ever active
            let active = tickets.iter().filter(|t| t.is_active()).count();
            prop_assert!(active <= 1);
        }

        for key in &completed {
            prop_assert!(controller.is_completed(*key));
        }
    }
}

#[test]
fn test_superseded_ticket_cannot_record() {
    let controller = LoadController::new();
    let SessionDecision::Started(old) = controller.begin(SessionKey::new(0, 0)) else {
        panic!("expected a new session");
    };
    let SessionDecision::Started(_new) = controller.begin(SessionKey::new(0, 1)) else {
        panic!("expected a new session");
    };

    assert!(!controller.mark_in_flight(&old));
    assert!(!controller.record_viewpoint(&old, 0));
    assert!(!controller.fail(&old));
    assert!(!controller.complete(&old));
    assert!(!controller.is_completed(SessionKey::new(0, 0)));
}

#[test]
fn test_forget_completed_keeps_current_session() {
    let controller = LoadController::new();
    let SessionDecision::Started(a) = controller.begin(SessionKey::new(0, 0)) else {
        panic!("expected a new session");
    };
    controller.record_viewpoint(&a, 0);
    controller.complete(&a);
    let SessionDecision::Started(b) = controller.begin(SessionKey::new(1, 0)) else {
        panic!("expected a new session");
    };

    controller.forget_completed();

    assert!(b.is_active());
    assert!(!controller.is_completed(SessionKey::new(0, 0)));
}

#[test]
fn test_concurrent_begins_leave_one_active() {
    let controller = Arc::new(LoadController::new());
    let tickets: Vec<SessionTicket> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = Arc::clone(&controller);
                scope.spawn(move || controller.begin(SessionKey::new(i, 0)))
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| match h.join().unwrap() {
                SessionDecision::Started(ticket) => Some(ticket),
                _ => None,
            })
            .collect()
    });

    assert_eq!(tickets.len(), 8);
    assert_eq!(tickets.iter().filter(|t| t.is_active()).count(), 1);
    assert_eq!(controller.stats().started, 8);
    assert_eq!(controller.stats().superseded, 7);
}
