//! Declarative key bindings
//!
//! [`BINDINGS`] is the single source of truth for keyboard input: [`resolve`]
//! dispatches a [`KeyStroke`] through it and the help overlay is rendered from
//! it with [`help_rows`]. Nothing here touches real input events.

use crate::navigator::NavCommand;
use serde::Serialize;
use std::fmt;

/// Keys the surface reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Space bar
    Space,
    /// Escape
    Escape,
    /// Printable character
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("←"),
            Self::Right => f.write_str("→"),
            Self::Up => f.write_str("↑"),
            Self::Down => f.write_str("↓"),
            Self::Space => f.write_str("Space"),
            Self::Escape => f.write_str("Esc"),
            Self::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
        }
    }
}

/// One key press with its shift state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyStroke {
    /// Key
    pub key: Key,
    /// Shift held
    pub shift: bool,
}

impl KeyStroke {
    /// Unshifted key press
    #[inline]
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// Shifted key press
    #[inline]
    #[must_use]
    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }

    /// Character key, stored as given
    ///
    /// Letters are case-folded when matched against the binding table.
    #[inline]
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }
}

/// Surface facts bindings are conditioned on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingContext {
    /// Viewpoints of the active landmark
    pub viewpoint_count: usize,
    /// Whether a location callback is registered
    pub map_available: bool,
}

/// When a binding applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Condition {
    /// Always
    Always,
    /// Active landmark has more than one viewpoint
    MultiViewpoint,
    /// A map callback is registered
    MapAvailable,
}

impl Condition {
    fn holds(self, ctx: &BindingContext) -> bool {
        match self {
            Self::Always => true,
            Self::MultiViewpoint => ctx.viewpoint_count > 1,
            Self::MapAvailable => ctx.map_available,
        }
    }
}

/// Shift requirement of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shift {
    /// Either state
    Any,
    /// Shift held
    Held,
    /// Shift not held
    Released,
}

impl Shift {
    fn matches(self, shift: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Held => shift,
            Self::Released => !shift,
        }
    }
}

/// What a binding listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pattern {
    /// One key with a shift requirement
    Key(Key, Shift),
    /// Digits 1-9
    Digit,
}

/// What a binding does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Fixed command
    Command(NavCommand),
    /// Select the viewpoint named by the digit
    JumpToDigit,
}

/// One row of the binding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Key pattern
    pub pattern: Pattern,
    /// Applicability
    pub condition: Condition,
    /// Effect
    pub action: Action,
    /// Help overlay key label; adjacent bindings sharing one form a single row
    pub keys: &'static str,
    /// Help overlay description
    pub description: &'static str,
}

const fn bind(
    key: Key,
    shift: Shift,
    condition: Condition,
    command: NavCommand,
    keys: &'static str,
    description: &'static str,
) -> Binding {
    Binding {
        pattern: Pattern::Key(key, shift),
        condition,
        action: Action::Command(command),
        keys,
        description,
    }
}

/// The binding table, matched top to bottom
#[rustfmt::skip]
pub static BINDINGS: &[Binding] = &[
    bind(Key::Left, Shift::Released, Condition::Always, NavCommand::PreviousLandmark, "← / →", "Previous / next landmark"),
    bind(Key::Right, Shift::Released, Condition::Always, NavCommand::NextLandmark, "← / →", "Previous / next landmark"),
    bind(Key::Left, Shift::Held, Condition::MultiViewpoint, NavCommand::PreviousViewpoint, "Shift + ← / →", "Previous / next view"),
    bind(Key::Right, Shift::Held, Condition::MultiViewpoint, NavCommand::NextViewpoint, "Shift + ← / →", "Previous / next view"),
    bind(Key::Up, Shift::Any, Condition::MultiViewpoint, NavCommand::PreviousViewpoint, "↑ / ↓", "Previous / next view"),
    bind(Key::Down, Shift::Any, Condition::MultiViewpoint, NavCommand::NextViewpoint, "↑ / ↓", "Previous / next view"),
    Binding {
        pattern: Pattern::Digit,
        condition: Condition::MultiViewpoint,
        action: Action::JumpToDigit,
        keys: "1-9",
        description: "Jump to view",
    },
    bind(Key::Space, Shift::Released, Condition::Always, NavCommand::NextLandmark, "Space / Shift + Space", "Next / previous landmark"),
    bind(Key::Space, Shift::Held, Condition::Always, NavCommand::PreviousLandmark, "Space / Shift + Space", "Next / previous landmark"),
    bind(Key::Char('f'), Shift::Any, Condition::Always, NavCommand::ToggleFullscreen, "F", "Toggle fullscreen"),
    bind(Key::Char('i'), Shift::Any, Condition::Always, NavCommand::ToggleInfo, "I", "Toggle details"),
    bind(Key::Char('m'), Shift::Any, Condition::MapAvailable, NavCommand::ShowOnMap, "M", "Show on map"),
    bind(Key::Escape, Shift::Any, Condition::Always, NavCommand::Escape, "Esc", "Close help or viewer"),
    bind(Key::Char('?'), Shift::Any, Condition::Always, NavCommand::ToggleHelp, "?", "Toggle this help"),
];

/// A resolved key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Command to dispatch
    pub command: NavCommand,
    /// Whether the platform's default handling must be suppressed
    pub prevent_default: bool,
}

fn normalize(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn digit_of(key: Key) -> Option<u8> {
    match key {
        Key::Char(c @ '1'..='9') => c.to_digit(10).and_then(|d| u8::try_from(d).ok()),
        _ => None,
    }
}

/// Resolve a key press against [`BINDINGS`]
#[must_use]
pub fn resolve(stroke: KeyStroke, ctx: &BindingContext) -> Option<Resolved> {
    resolve_in(BINDINGS, stroke, ctx)
}

/// Resolve a key press against a custom table
#[must_use]
pub fn resolve_in(table: &[Binding], stroke: KeyStroke, ctx: &BindingContext) -> Option<Resolved> {
    let key = normalize(stroke.key);
    table.iter().find_map(|binding| {
        if !binding.condition.holds(ctx) {
            return None;
        }
        let command = match (binding.pattern, binding.action) {
            (Pattern::Key(k, shift), Action::Command(command)) => {
                (normalize(k) == key && shift.matches(stroke.shift)).then_some(command)?
            }
            (Pattern::Digit, Action::JumpToDigit) => {
                let digit = digit_of(key)?;
                // Digits past the last viewpoint are not consumed
                (usize::from(digit) <= ctx.viewpoint_count)
                    .then_some(NavCommand::SelectDigit(digit))?
            }
            _ => return None,
        };
        Some(Resolved {
            command,
            prevent_default: true,
        })
    })
}

/// One help overlay row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HelpRow {
    /// Key label
    pub keys: &'static str,
    /// What it does
    pub description: &'static str,
}

/// Help overlay rows, one per distinct key label
#[must_use]
pub fn help_rows() -> Vec<HelpRow> {
    let mut rows: Vec<HelpRow> = Vec::new();
    for binding in BINDINGS {
        if rows.last().is_some_and(|row| row.keys == binding.keys) {
            continue;
        }
        rows.push(HelpRow {
            keys: binding.keys,
            description: binding.description,
        });
    }
    rows
}
