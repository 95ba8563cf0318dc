//! Core traits that decouple i3pomo from the concrete timer, window manager
//! and notification daemon.
//!
//! The [`WorkspaceGuard`](crate::guard::WorkspaceGuard),
//! [`NotificationSync`](crate::daemon::NotificationSync) and
//! [`Daemon`](crate::daemon::Daemon) only depend on these abstractions.
//! Concrete backends live in [`dbus`](crate::dbus), [`i3`](crate::i3) and
//! [`nagbar`](crate::nagbar).

use crate::event::TimerSnapshot;
use std::sync::mpsc;

/// Read access to the pomodoro timer.
pub trait TimerService: Send {
    /// The error type produced by this timer.
    type Error: std::error::Error + Send + 'static;

    /// Query the current state.  Never cached: every call asks the service.
    fn snapshot(&self) -> Result<TimerSnapshot, Self::Error>;
}

/// The subset of window-manager control the daemon needs.
pub trait WindowManager: Send {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Name of the currently focused workspace.
    fn focused_workspace_name(&self) -> Result<String, Self::Error>;

    /// Ask the window manager to switch to the workspace called `name`.
    ///
    /// Returns once the command has been submitted.  The resulting focus
    /// event may arrive before or after this call returns.
    fn activate(&self, name: &str) -> Result<(), Self::Error>;
}

/// Pause/resume switch for desktop notifications.
///
/// Both calls are idempotent: pausing twice leaves notifications paused.
pub trait NotificationGate: Send {
    /// The error type produced by this gate.
    type Error: std::error::Error + Send + 'static;

    fn pause(&self) -> Result<(), Self::Error>;

    fn resume(&self) -> Result<(), Self::Error>;
}

/// How loudly a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// The `-t` argument understood by `i3-nagbar` and `swaynag`.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A user-visible place to show warnings.
pub trait WarningSurface: Send {
    /// The error type produced by this surface.
    type Error: std::error::Error + Send + 'static;

    /// Show `message`.  Fire-and-forget: returns once the message has been
    /// handed off.
    fn show(&self, severity: Severity, message: &str) -> Result<(), Self::Error>;
}

/// A source of events.
///
/// Implementations listen on some transport (the session bus, the i3 event
/// socket, a test fixture, …) and forward decoded events into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the stream ends or an
///   unrecoverable error occurs.  Either way the daemon treats the return as
///   the end of that listener.
/// * Events are sent in the order the service emitted them.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The event type this source produces.
    type Event: Send + 'static;

    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every event into `sink`.
    ///
    /// Returns `Ok(())` when the stream ends cleanly or the receiver goes
    /// away.
    fn run(&mut self, sink: mpsc::Sender<Self::Event>) -> Result<(), Self::Error>;
}
