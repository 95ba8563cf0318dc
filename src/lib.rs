//! **i3pomo** — keeps i3 / sway and dunst in step with GNOME Pomodoro.
//!
//! While a pomodoro is running the daemon pauses desktop notifications and
//! sends you back whenever you focus one of the restricted workspaces.  Breaks,
//! pauses and idle time lift both restrictions.
//!
//! # Architecture
//!
//! The crate is organised around the traits in [`traits`]:
//!
//! * [`traits::TimerService`], [`traits::WindowManager`],
//!   [`traits::NotificationGate`] and [`traits::WarningSurface`] abstract the
//!   external services so the policy logic is not coupled to any of them.
//! * [`traits::EventSource`] abstracts the transport that delivers events
//!   (a session-bus signal, the i3 event socket, a test fixture, …).
//!
//! [`guard`] enforces the [`policy`] on focus events, [`daemon`] runs the two
//! listeners.  Concrete implementations live in [`dbus`] (GNOME Pomodoro and
//! dunst), [`i3`] (i3 / sway IPC) and [`nagbar`].

pub mod config;
pub mod control;
pub mod daemon;
pub mod dbus;
pub mod error;
pub mod event;
pub mod format;
pub mod guard;
pub mod i3;
pub mod nagbar;
pub mod policy;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;
