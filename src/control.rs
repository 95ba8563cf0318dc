//! Commands that change the timer, and the toggles built on top of them.

use crate::event::{TimerSnapshot, TimerState};
use std::fmt;

/// A method on the timer service that changes its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Stop,
    Pause,
    Resume,
    Skip,
    Reset,
}

impl TimerCommand {
    /// D-Bus method name on `org.gnome.Pomodoro`.
    pub fn method_name(self) -> &'static str {
        match self {
            TimerCommand::Start => "Start",
            TimerCommand::Stop => "Stop",
            TimerCommand::Pause => "Pause",
            TimerCommand::Resume => "Resume",
            TimerCommand::Skip => "Skip",
            TimerCommand::Reset => "Reset",
        }
    }
}

impl fmt::Display for TimerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Pause a running timer, resume a paused one.
pub fn toggle(snapshot: &TimerSnapshot) -> TimerCommand {
    if snapshot.is_paused {
        TimerCommand::Resume
    } else {
        TimerCommand::Pause
    }
}

/// Start a pomodoro when idle, stop one that is running.  Breaks are left
/// alone.
pub fn start_stop(snapshot: &TimerSnapshot) -> Option<TimerCommand> {
    match snapshot.state {
        TimerState::Idle => Some(TimerCommand::Start),
        TimerState::Focus => Some(TimerCommand::Stop),
        TimerState::ShortBreak | TimerState::LongBreak => None,
    }
}
