//! Values that flow between the external services and the daemon.
//!
//! [`TimerSnapshot`] and [`TimerStateChange`] come from the pomodoro timer,
//! [`WorkspaceFocusEvent`] from the window manager.  All of them are plain
//! immutable values: a newer snapshot replaces an older one entirely.

use std::fmt;
use std::str::FromStr;

/// The phase the pomodoro timer is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerState {
    /// No interval is running.
    #[default]
    Idle,
    /// A focus interval ("pomodoro").
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerState {
    /// The state name used on the wire by the timer service.
    pub fn wire_name(self) -> &'static str {
        match self {
            TimerState::Idle => "null",
            TimerState::Focus => "pomodoro",
            TimerState::ShortBreak => "short-break",
            TimerState::LongBreak => "long-break",
        }
    }

    /// `true` during a focus interval.
    pub fn is_focus(self) -> bool {
        self == TimerState::Focus
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Error for a state name the timer service is not known to send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timer state: {0:?}")]
pub struct UnknownTimerState(pub String);

impl FromStr for TimerState {
    type Err = UnknownTimerState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(TimerState::Idle),
            "pomodoro" => Ok(TimerState::Focus),
            "short-break" => Ok(TimerState::ShortBreak),
            "long-break" => Ok(TimerState::LongBreak),
            other => Err(UnknownTimerState(other.to_string())),
        }
    }
}

/// Point-in-time view of the timer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub is_paused: bool,
    /// Seconds elapsed in the current state.
    pub elapsed: f64,
    /// Total length of the current state in seconds.
    pub duration: f64,
}

impl TimerSnapshot {
    /// Seconds left in the current state.
    pub fn remaining(&self) -> f64 {
        self.duration - self.elapsed
    }

    /// `true` when workspace restrictions apply: a focus interval that is
    /// actually running.
    pub fn is_focusing(&self) -> bool {
        self.state.is_focus() && !self.is_paused
    }
}

/// One state transition reported by the timer service.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerStateChange {
    pub current: TimerSnapshot,
    pub previous: TimerSnapshot,
}

/// The window manager moved focus to another workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFocusEvent {
    pub num: i32,
    pub name: String,
}

impl WorkspaceFocusEvent {
    pub fn new(num: i32, name: impl Into<String>) -> Self {
        Self {
            num,
            name: name.into(),
        }
    }
}
