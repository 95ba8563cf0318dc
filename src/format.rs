//! Rendering of the timer state for status bars.
//!
//! Two output flavours are supported: a plain text line (i3bar, i3blocks,
//! polybar, …) and a waybar `custom` module JSON object.

use crate::event::{TimerSnapshot, TimerState};
use serde::Serialize;

/// Options for [`StatusFormatter`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOptions {
    /// Label used for focus intervals, and the constant icon with `always`.
    pub icon_text: String,
    /// Render `MM:SS` instead of `MMm`.
    pub show_seconds: bool,
    /// Print the icon even when the timer is idle.
    pub always: bool,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            icon_text: "Pomodoro".into(),
            show_seconds: true,
            always: false,
        }
    }
}

/// Format a duration in seconds as `MM:SS` (or `MMm`).
///
/// The value is rounded to whole seconds first, so `59.6` is `01:00` and not
/// `00:60`.  Negative values clamp to zero.
pub fn format_time(seconds: f64, show_seconds: bool) -> String {
    let total = seconds.round().max(0.0) as u64;
    let minutes = total / 60;
    if show_seconds {
        format!("{:02}:{:02}", minutes, total % 60)
    } else {
        format!("{:02}m", minutes)
    }
}

/// Waybar `custom` module payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaybarOutput {
    pub class: String,
    pub text: String,
    pub tooltip: String,
}

/// Renders [`TimerSnapshot`]s according to [`StatusOptions`].
#[derive(Debug, Clone, Default)]
pub struct StatusFormatter {
    options: StatusOptions,
}

impl StatusFormatter {
    pub fn new(options: StatusOptions) -> Self {
        Self { options }
    }

    /// Human label for a state.  Idle has no label.
    pub fn state_label(&self, state: TimerState) -> &str {
        match state {
            TimerState::Idle => "",
            TimerState::Focus => &self.options.icon_text,
            TimerState::ShortBreak => "Break",
            TimerState::LongBreak => "Long Break",
        }
    }

    fn time(&self, seconds: f64) -> String {
        format_time(seconds, self.options.show_seconds)
    }

    /// Plain text line, e.g. `Pomodoro 24:13 ` or `Break 03:00  PAUSED `.
    pub fn text(&self, snapshot: &TimerSnapshot) -> String {
        if snapshot.state == TimerState::Idle {
            return self.idle_text();
        }
        let paused = if snapshot.is_paused { " PAUSED " } else { "" };
        format!(
            "{} {} {}",
            self.state_label(snapshot.state),
            self.time(snapshot.remaining()),
            paused
        )
    }

    /// Waybar JSON payload.
    pub fn waybar(&self, snapshot: &TimerSnapshot) -> WaybarOutput {
        if snapshot.state == TimerState::Idle {
            return WaybarOutput {
                class: "stopped".into(),
                text: self.idle_text(),
                tooltip: String::new(),
            };
        }
        let icon = if self.options.icon_text.is_empty() {
            String::new()
        } else {
            format!("{} ", self.options.icon_text)
        };
        let remaining = self.time(snapshot.remaining());
        WaybarOutput {
            class: if snapshot.is_paused { "paused" } else { "" }.into(),
            text: format!("{}{}", icon, remaining),
            tooltip: format!(
                "Elapsed: {}\nRemaining: {}",
                self.time(snapshot.elapsed),
                remaining
            ),
        }
    }

    /// Waybar JSON payload serialised to a single line.
    pub fn waybar_json(&self, snapshot: &TimerSnapshot) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.waybar(snapshot))
    }

    fn idle_text(&self) -> String {
        if self.options.always {
            self.options.icon_text.clone()
        } else {
            String::new()
        }
    }
}
