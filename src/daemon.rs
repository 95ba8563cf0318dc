//! The long-running daemon.
//!
//! Two listeners run side by side, each on its own pair of threads:
//!
//! | Listener    | Source thread                         | Handler thread        |
//! |-------------|---------------------------------------|-----------------------|
//! | `Timer`     | timer `StateChanged` signal stream    | [`NotificationSync`]  |
//! | `Workspace` | window-manager `workspace` events     | [`WorkspaceGuard`]    |
//!
//! A source thread forwards decoded events into an `mpsc` channel; the
//! handler thread owns all handler state and processes one event at a time.
//! When a source returns (cleanly or not) its channel closes, the handler
//! drains what is left and reports a [`ListenerExit`] to the supervisor.  A
//! handler that panics still reports, as [`ExitReason::Panicked`].  The first
//! report ends [`Daemon::run`].

use crate::event::{TimerSnapshot, TimerStateChange, WorkspaceFocusEvent};
use crate::guard::WorkspaceGuard;
use crate::traits::{EventSource, NotificationGate, TimerService, WarningSurface, WindowManager};
use log::{debug, error, info};
use std::fmt;
use std::sync::mpsc;
use std::thread;

/// Mirrors the timer state into the notification gate.
pub struct NotificationSync<G> {
    gate: G,
}

impl<G: NotificationGate> NotificationSync<G> {
    pub fn new(gate: G) -> Self {
        Self { gate }
    }

    /// Pause notifications during a focus interval, resume them otherwise.
    ///
    /// Only the current state matters; duplicates are harmless because the
    /// gate is idempotent.  Failures are logged and swallowed.
    pub fn apply(&self, snapshot: &TimerSnapshot) {
        let result = if snapshot.state.is_focus() {
            debug!("timer in {}, pausing notifications", snapshot.state);
            self.gate.pause()
        } else {
            debug!("timer in {}, resuming notifications", snapshot.state);
            self.gate.resume()
        };
        if let Err(e) = result {
            error!("notification gate error: {}", e);
        }
    }

    /// Handle one state transition.
    pub fn handle(&self, change: &TimerStateChange) {
        debug!(
            "timer state changed: {} -> {}",
            change.previous.state, change.current.state
        );
        self.apply(&change.current);
    }
}

/// Which listener an exit report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    Timer,
    Workspace,
}

impl Listener {
    /// Process exit status used when this listener takes the daemon down.
    pub fn exit_code(self) -> i32 {
        match self {
            Listener::Timer => 2,
            Listener::Workspace => 3,
        }
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Timer => write!(f, "timer"),
            Listener::Workspace => write!(f, "workspace"),
        }
    }
}

/// Why a listener stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The event stream ended without an error.
    StreamEnded,
    /// The source returned an error.
    Failed(String),
    /// The source thread panicked.
    Panicked,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StreamEnded => write!(f, "event stream ended"),
            ExitReason::Failed(e) => write!(f, "{}", e),
            ExitReason::Panicked => write!(f, "source thread panicked"),
        }
    }
}

/// Report sent by a listener once it has stopped and drained its queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerExit {
    pub listener: Listener,
    pub reason: ExitReason,
}

impl ListenerExit {
    pub fn exit_code(&self) -> i32 {
        self.listener.exit_code()
    }
}

/// The running daemon: a workspace guard and a notification sync, each fed
/// by its own event source.
pub struct Daemon<T, W, S, G> {
    guard: WorkspaceGuard<T, W, S>,
    sync: NotificationSync<G>,
}

impl<T, W, S, G> Daemon<T, W, S, G>
where
    T: TimerService + 'static,
    W: WindowManager + 'static,
    S: WarningSurface + 'static,
    G: NotificationGate + 'static,
{
    pub fn new(guard: WorkspaceGuard<T, W, S>, sync: NotificationSync<G>) -> Self {
        Self { guard, sync }
    }

    /// Start both listeners and block until the first one stops.
    pub fn run<TS, FS>(self, timer_events: TS, focus_events: FS) -> ListenerExit
    where
        TS: EventSource<Event = TimerStateChange> + 'static,
        FS: EventSource<Event = WorkspaceFocusEvent> + 'static,
    {
        let (exit_tx, exit_rx) = mpsc::channel::<ListenerExit>();

        let sync = self.sync;
        spawn_listener(Listener::Timer, timer_events, exit_tx.clone(), move |change| {
            sync.handle(&change)
        });

        let mut guard = self.guard;
        spawn_listener(Listener::Workspace, focus_events, exit_tx, move |event| {
            guard.handle(&event);
        });

        info!("i3pomo daemon running");
        match exit_rx.recv() {
            Ok(exit) => {
                info!("{} listener stopped: {}", exit.listener, exit.reason);
                exit
            }
            // Both handler threads died without reporting.
            Err(_) => ListenerExit {
                listener: Listener::Workspace,
                reason: ExitReason::Panicked,
            },
        }
    }
}

/// Sends the exit report when the handler thread ends, unwinding included.
struct ExitReport {
    listener: Listener,
    reason: Option<ExitReason>,
    tx: mpsc::Sender<ListenerExit>,
}

impl Drop for ExitReport {
    fn drop(&mut self) {
        let reason = self.reason.take().unwrap_or_else(|| {
            error!("{} handler panicked", self.listener);
            ExitReason::Panicked
        });
        let _ = self.tx.send(ListenerExit {
            listener: self.listener,
            reason,
        });
    }
}

/// Spawn the source and handler threads for one listener.
fn spawn_listener<E, F>(
    listener: Listener,
    mut source: E,
    exit_tx: mpsc::Sender<ListenerExit>,
    mut handle: F,
) where
    E: EventSource + 'static,
    F: FnMut(E::Event) + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<E::Event>();

    let source_thread = thread::spawn(move || source.run(tx).map_err(|e| e.to_string()));

    thread::spawn(move || {
        let mut report = ExitReport {
            listener,
            reason: None,
            tx: exit_tx,
        };
        info!("{} listener started", listener);
        for event in rx {
            handle(event);
        }
        report.reason = Some(match source_thread.join() {
            Ok(Ok(())) => ExitReason::StreamEnded,
            Ok(Err(e)) => {
                error!("{} listener error: {}", listener, e);
                ExitReason::Failed(e)
            }
            Err(_) => ExitReason::Panicked,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbus::pomodoro::initial_change;
    use crate::event::TimerState;
    use crate::policy::WorkspacePolicy;
    use crate::test_support::{
        FailingSource, GateCall, HeldSource, MockTimer, RecordingGate, RecordingSurface,
        RecordingWm, VecSource,
    };

    fn snapshot(state: TimerState) -> TimerSnapshot {
        TimerSnapshot {
            state,
            is_paused: false,
            elapsed: 0.0,
            duration: 1500.0,
        }
    }

    fn change(from: TimerState, to: TimerState) -> TimerStateChange {
        TimerStateChange {
            current: snapshot(to),
            previous: snapshot(from),
        }
    }

    type TestDaemon = Daemon<MockTimer, RecordingWm, RecordingSurface, RecordingGate>;

    fn make_daemon(timer: &MockTimer, wm: &RecordingWm, gate: &RecordingGate) -> TestDaemon {
        let guard =
            WorkspaceGuard::start(timer.clone(), wm.clone(), WorkspacePolicy::new([3])).unwrap();
        Daemon::new(guard, NotificationSync::new(gate.clone()))
    }

    #[test]
    fn idle_to_focus_pauses_once() {
        let gate = RecordingGate::new();
        let sync = NotificationSync::new(gate.clone());
        sync.handle(&change(TimerState::Idle, TimerState::Focus));
        assert_eq!(gate.calls(), vec![GateCall::Pause]);
        assert!(gate.is_paused());
    }

    #[test]
    fn focus_to_break_resumes_once() {
        let gate = RecordingGate::new();
        let sync = NotificationSync::new(gate.clone());
        sync.handle(&change(TimerState::Idle, TimerState::Focus));
        sync.handle(&change(TimerState::Focus, TimerState::ShortBreak));
        assert_eq!(gate.calls(), vec![GateCall::Pause, GateCall::Resume]);
        assert!(!gate.is_paused());
    }

    #[test]
    fn duplicate_focus_pauses_each_time_without_extra_effect() {
        let gate = RecordingGate::new();
        let sync = NotificationSync::new(gate.clone());
        sync.handle(&change(TimerState::Idle, TimerState::Focus));
        sync.handle(&change(TimerState::Focus, TimerState::Focus));
        assert_eq!(gate.calls(), vec![GateCall::Pause, GateCall::Pause]);
        assert!(gate.is_paused());
    }

    #[test]
    fn gate_failure_is_swallowed() {
        let gate = RecordingGate::failing();
        let sync = NotificationSync::new(gate.clone());
        sync.handle(&change(TimerState::Idle, TimerState::Focus));
        sync.handle(&change(TimerState::Focus, TimerState::LongBreak));
        assert_eq!(gate.calls().len(), 2);
    }

    #[test]
    fn initial_sync_precedes_live_changes() {
        let timer = MockTimer::new(TimerState::Focus);
        let wm = RecordingWm::new("1:web");
        let gate = RecordingGate::new();
        let daemon = make_daemon(&timer, &wm, &gate);

        // Started mid-pomodoro; the pomodoro ends right after subscribing.
        let timer_events = VecSource::new(vec![
            initial_change(&timer).unwrap(),
            change(TimerState::Focus, TimerState::ShortBreak),
        ]);
        let (focus_events, _hold) = HeldSource::new();

        let exit = daemon.run(timer_events, focus_events);
        assert_eq!(exit.listener, Listener::Timer);
        assert_eq!(gate.calls(), vec![GateCall::Pause, GateCall::Resume]);
        assert!(!gate.is_paused());
    }

    #[test]
    fn panicking_handler_still_reports_exit() {
        let (exit_tx, exit_rx) = mpsc::channel();
        spawn_listener(
            Listener::Timer,
            VecSource::new(vec![change(TimerState::Idle, TimerState::Focus)]),
            exit_tx,
            |_| panic!("handler bug"),
        );
        let exit = exit_rx.recv().unwrap();
        assert_eq!(
            exit,
            ListenerExit {
                listener: Listener::Timer,
                reason: ExitReason::Panicked,
            }
        );
    }

    #[test]
    fn workspace_stream_end_stops_daemon_after_draining() {
        let timer = MockTimer::new(TimerState::Focus);
        let wm = RecordingWm::new("1:web");
        let gate = RecordingGate::new();
        let daemon = make_daemon(&timer, &wm, &gate);

        let (timer_events, _hold) = HeldSource::new();
        let focus_events = VecSource::new(vec![
            WorkspaceFocusEvent::new(3, "3:chat"),
            WorkspaceFocusEvent::new(4, "4:term"),
            WorkspaceFocusEvent::new(3, "3:chat"),
        ]);

        let exit = daemon.run(timer_events, focus_events);
        assert_eq!(
            exit,
            ListenerExit {
                listener: Listener::Workspace,
                reason: ExitReason::StreamEnded,
            }
        );
        assert_eq!(exit.exit_code(), 3);
        assert_eq!(
            wm.activations(),
            vec!["1:web".to_string(), "4:term".to_string()]
        );
    }

    #[test]
    fn timer_stream_drives_gate() {
        let timer = MockTimer::new(TimerState::Idle);
        let wm = RecordingWm::new("1:web");
        let gate = RecordingGate::new();
        let daemon = make_daemon(&timer, &wm, &gate);

        let timer_events = VecSource::new(vec![
            change(TimerState::Idle, TimerState::Focus),
            change(TimerState::Focus, TimerState::ShortBreak),
        ]);
        let (focus_events, _hold) = HeldSource::new();

        let exit = daemon.run(timer_events, focus_events);
        assert_eq!(exit.listener, Listener::Timer);
        assert_eq!(exit.exit_code(), 2);
        assert_eq!(gate.calls(), vec![GateCall::Pause, GateCall::Resume]);
    }

    #[test]
    fn source_error_is_reported() {
        let timer = MockTimer::new(TimerState::Idle);
        let wm = RecordingWm::new("1:web");
        let gate = RecordingGate::new();
        let daemon = make_daemon(&timer, &wm, &gate);

        let (timer_events, _hold) = HeldSource::new();
        let exit = daemon.run(timer_events, FailingSource::new());
        assert_eq!(exit.listener, Listener::Workspace);
        assert!(matches!(exit.reason, ExitReason::Failed(ref e) if e.contains("connection lost")));
    }

    #[test]
    fn listener_names() {
        assert_eq!(Listener::Timer.to_string(), "timer");
        assert_eq!(Listener::Workspace.to_string(), "workspace");
        assert_ne!(Listener::Timer.exit_code(), Listener::Workspace.exit_code());
    }
}
