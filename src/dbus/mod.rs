//! Session-bus implementations.
//!
//! [`pomodoro`] provides the [`TimerService`](crate::traits::TimerService)
//! and the timer [`EventSource`](crate::traits::EventSource);
//! [`notifications`] provides the
//! [`NotificationGate`](crate::traits::NotificationGate).

pub mod notifications;
pub mod pomodoro;
