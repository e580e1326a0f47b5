//! Navigator state machine
//!
//! Tracks the active landmark and viewpoint plus the display toggles. Every
//! input (buttons, keys, thumbnail clicks) arrives as a [`NavCommand`] and is
//! answered with a [`NavEvent`] describing what changed.

use crate::error::NavError;
use pano_viewpoint::BoundedIndex;
use serde::Serialize;

/// Navigation state of one viewing surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavigatorState {
    /// Index into the current landmark list
    pub landmark_index: usize,
    /// Index into the current landmark's viewpoints
    pub viewpoint_index: usize,
    /// Fullscreen display
    pub is_fullscreen: bool,
    /// Metadata panel shown
    pub is_info_visible: bool,
    /// Help overlay shown
    pub is_help_visible: bool,
}

/// Input to the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NavCommand {
    /// Step to the next landmark (wraps)
    NextLandmark,
    /// Step to the previous landmark (wraps)
    PreviousLandmark,
    /// Step to the next viewpoint (wraps)
    NextViewpoint,
    /// Step to the previous viewpoint (wraps)
    PreviousViewpoint,
    /// Select a viewpoint by index (clamped)
    SelectViewpoint(usize),
    /// Digit key 1-9; selects `digit - 1` when it exists
    SelectDigit(u8),
    /// Select a landmark by index
    SelectLandmark(usize),
    /// Toggle fullscreen
    ToggleFullscreen,
    /// Toggle the metadata panel
    ToggleInfo,
    /// Toggle the help overlay
    ToggleHelp,
    /// Emit the active coordinate to the map
    ShowOnMap,
    /// Close help if open, else close the surface
    Escape,
}

/// Result of applying a [`NavCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavEvent {
    /// Nothing changed
    Unchanged,
    /// Active landmark changed; viewpoint index is back at 0
    LandmarkChanged {
        /// Previous landmark
        from: usize,
        /// New landmark
        to: usize,
    },
    /// Active viewpoint changed within the landmark
    ViewpointChanged {
        /// Previous viewpoint
        from: usize,
        /// New viewpoint
        to: usize,
    },
    /// A display toggle flipped
    DisplayChanged,
    /// The map collaborator should be notified
    ShowOnMap,
    /// The surface should close
    CloseRequested,
}

/// Viewpoint and landmark navigation
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigatorState,
    landmark_count: usize,
    viewpoint_count: usize,
}

impl Navigator {
    /// Open on `initial` of `landmark_count` landmarks
    ///
    /// # Errors
    /// - `NavError::NoLandmarks` for an empty list
    /// - `NavError::LandmarkOutOfRange` when `initial` addresses nothing
    pub fn new(landmark_count: usize, initial: usize) -> Result<Self, NavError> {
        if landmark_count == 0 {
            return Err(NavError::NoLandmarks);
        }
        if initial >= landmark_count {
            return Err(NavError::LandmarkOutOfRange {
                index: initial,
                len: landmark_count,
            });
        }
        Ok(Self {
            state: NavigatorState {
                landmark_index: initial,
                ..NavigatorState::default()
            },
            landmark_count,
            viewpoint_count: 0,
        })
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> NavigatorState {
        self.state
    }

    /// Number of landmarks
    #[inline]
    #[must_use]
    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    /// Number of viewpoints of the active landmark (0 until known)
    #[inline]
    #[must_use]
    pub fn viewpoint_count(&self) -> usize {
        self.viewpoint_count
    }

    /// Whether viewpoint navigation is live (dial shown)
    #[inline]
    #[must_use]
    pub fn is_multi_viewpoint(&self) -> bool {
        self.viewpoint_count > 1
    }

    /// Install the active landmark's viewpoint count; clamps the index
    pub fn set_viewpoint_count(&mut self, count: usize) {
        self.viewpoint_count = count;
        self.state.viewpoint_index = self.state.viewpoint_index.min(count.saturating_sub(1));
    }

    /// Install a new landmark list length, moving to `follow` (or clamping)
    ///
    /// Without `follow` the active landmark counts as changed even when its
    /// index survives. The viewpoint count is kept only when the followed landmark
    /// keeps its index.
    ///
    /// # Errors
    /// `NavError::NoLandmarks` for an empty list
    pub fn replace_landmarks(
        &mut self,
        landmark_count: usize,
        follow: Option<usize>,
    ) -> Result<NavEvent, NavError> {
        if landmark_count == 0 {
            return Err(NavError::NoLandmarks);
        }
        let from = self.state.landmark_index;
        self.landmark_count = landmark_count;
        match follow.filter(|i| *i < landmark_count) {
            Some(to) if to == from => Ok(NavEvent::Unchanged),
            Some(to) => Ok(self.move_to_landmark(to)),
            // Identity lost; the clamped slot holds a different landmark
            None => Ok(self.move_to_landmark(from.min(landmark_count - 1))),
        }
    }

    /// Select viewpoint `index`, clamped into range; inert with one viewpoint
    pub fn select_index(&mut self, index: usize) -> NavEvent {
        if !self.is_multi_viewpoint() {
            return NavEvent::Unchanged;
        }
        let to = index.min(self.viewpoint_count - 1);
        self.move_to_viewpoint(to)
    }

    /// Step the viewpoint by `delta`, wrapping
    pub fn step_relative(&mut self, delta: isize) -> NavEvent {
        if !self.is_multi_viewpoint() {
            return NavEvent::Unchanged;
        }
        let Some(current) = BoundedIndex::new(self.state.viewpoint_index, self.viewpoint_count)
        else {
            return NavEvent::Unchanged;
        };
        self.move_to_viewpoint(current.wrapping_offset(delta).get())
    }

    /// Digit key: selects `digit - 1` when that viewpoint exists
    pub fn select_digit(&mut self, digit: u8) -> NavEvent {
        let index = match digit {
            1..=9 => usize::from(digit - 1),
            _ => return NavEvent::Unchanged,
        };
        if !self.is_multi_viewpoint() || index >= self.viewpoint_count {
            return NavEvent::Unchanged;
        }
        self.move_to_viewpoint(index)
    }

    /// Step the landmark by `delta`, wrapping
    pub fn step_landmark(&mut self, delta: isize) -> NavEvent {
        let Some(current) = BoundedIndex::new(self.state.landmark_index, self.landmark_count) else {
            return NavEvent::Unchanged;
        };
        let to = current.wrapping_offset(delta).get();
        if to == self.state.landmark_index {
            return NavEvent::Unchanged;
        }
        self.move_to_landmark(to)
    }

    /// Select landmark `index`; out-of-range indices are ignored
    pub fn select_landmark(&mut self, index: usize) -> NavEvent {
        if index >= self.landmark_count || index == self.state.landmark_index {
            return NavEvent::Unchanged;
        }
        self.move_to_landmark(index)
    }

    /// Apply one command
    pub fn apply(&mut self, command: NavCommand) -> NavEvent {
        let event = match command {
            NavCommand::NextLandmark => self.step_landmark(1),
            NavCommand::PreviousLandmark => self.step_landmark(-1),
            NavCommand::NextViewpoint => self.step_relative(1),
            NavCommand::PreviousViewpoint => self.step_relative(-1),
            NavCommand::SelectViewpoint(index) => self.select_index(index),
            NavCommand::SelectDigit(digit) => self.select_digit(digit),
            NavCommand::SelectLandmark(index) => self.select_landmark(index),
            NavCommand::ToggleFullscreen => {
                self.state.is_fullscreen = !self.state.is_fullscreen;
                NavEvent::DisplayChanged
            }
            NavCommand::ToggleInfo => {
                self.state.is_info_visible = !self.state.is_info_visible;
                NavEvent::DisplayChanged
            }
            NavCommand::ToggleHelp => {
                self.state.is_help_visible = !self.state.is_help_visible;
                NavEvent::DisplayChanged
            }
            NavCommand::ShowOnMap => NavEvent::ShowOnMap,
            NavCommand::Escape if self.state.is_help_visible => {
                self.state.is_help_visible = false;
                NavEvent::DisplayChanged
            }
            NavCommand::Escape => NavEvent::CloseRequested,
        };
        tracing::trace!(?command, ?event, "navigator command");
        event
    }

    fn move_to_viewpoint(&mut self, to: usize) -> NavEvent {
        let from = self.state.viewpoint_index;
        if from == to {
            return NavEvent::Unchanged;
        }
        self.state.viewpoint_index = to;
        NavEvent::ViewpointChanged { from, to }
    }

    fn move_to_landmark(&mut self, to: usize) -> NavEvent {
        let from = self.state.landmark_index;
        self.state.landmark_index = to;
        self.state.viewpoint_index = 0;
        self.viewpoint_count = 0;
        NavEvent::LandmarkChanged { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(landmarks: usize, viewpoints: usize) -> Navigator {
        let mut nav = Navigator::new(landmarks, 0).unwrap();
        nav.set_viewpoint_count(viewpoints);
        nav
    }

    #[test]
    fn rejects_bad_construction() {
        assert_eq!(Navigator::new(0, 0).unwrap_err(), NavError::NoLandmarks);
        assert!(matches!(
            Navigator::new(2, 2),
            Err(NavError::LandmarkOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn viewpoint_stepping_wraps() {
        let mut nav = make(1, 4);
        assert_eq!(
            nav.step_relative(-1),
            NavEvent::ViewpointChanged { from: 0, to: 3 }
        );
        assert_eq!(
            nav.step_relative(1),
            NavEvent::ViewpointChanged { from: 3, to: 0 }
        );
    }

    #[test]
    fn single_viewpoint_is_inert() {
        let mut nav = make(1, 1);
        assert_eq!(nav.step_relative(1), NavEvent::Unchanged);
        assert_eq!(nav.select_index(3), NavEvent::Unchanged);
        assert_eq!(nav.select_digit(1), NavEvent::Unchanged);
        assert_eq!(nav.state().viewpoint_index, 0);
    }

    #[test]
    fn select_index_clamps() {
        let mut nav = make(1, 3);
        assert_eq!(
            nav.select_index(10),
            NavEvent::ViewpointChanged { from: 0, to: 2 }
        );
    }

    #[test]
    fn digits_select_existing_viewpoints() {
        let mut nav = make(1, 2);
        assert_eq!(nav.select_digit(3), NavEvent::Unchanged);

        let mut nav = make(1, 5);
        assert_eq!(
            nav.select_digit(3),
            NavEvent::ViewpointChanged { from: 0, to: 2 }
        );
        assert_eq!(nav.select_digit(0), NavEvent::Unchanged);
    }

    #[test]
    fn landmark_change_resets_viewpoint() {
        let mut nav = make(3, 4);
        nav.select_index(2);
        assert_eq!(
            nav.apply(NavCommand::PreviousLandmark),
            NavEvent::LandmarkChanged { from: 0, to: 2 }
        );
        assert_eq!(nav.state().viewpoint_index, 0);
        assert_eq!(nav.viewpoint_count(), 0);
    }

    #[test]
    fn escape_closes_help_first() {
        let mut nav = make(1, 1);
        nav.apply(NavCommand::ToggleHelp);
        assert_eq!(nav.apply(NavCommand::Escape), NavEvent::DisplayChanged);
        assert!(!nav.state().is_help_visible);
        assert_eq!(nav.apply(NavCommand::Escape), NavEvent::CloseRequested);
    }

    #[test]
    fn replace_follows_or_clamps() {
        let mut nav = Navigator::new(5, 4).unwrap();
        nav.set_viewpoint_count(3);

        assert_eq!(nav.replace_landmarks(6, Some(4)).unwrap(), NavEvent::Unchanged);
        assert_eq!(nav.viewpoint_count(), 3);

        assert_eq!(
            nav.replace_landmarks(3, None).unwrap(),
            NavEvent::LandmarkChanged { from: 4, to: 2 }
        );
        assert_eq!(
            nav.replace_landmarks(3, None).unwrap(),
            NavEvent::LandmarkChanged { from: 2, to: 2 }
        );
        assert_eq!(nav.replace_landmarks(0, None).unwrap_err(), NavError::NoLandmarks);
    }
}
