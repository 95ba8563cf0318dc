//! Recording test doubles for the traits in [`crate::traits`].
//!
//! Every double is `Clone` and shares its log through an `Arc<Mutex<_>>`, so
//! a test can hand one copy to a handler thread and inspect the other.

use crate::event::{TimerSnapshot, TimerState};
use crate::traits::{
    EventSource, NotificationGate, Severity, TimerService, WarningSurface, WindowManager,
};
use std::sync::{mpsc, Arc, Mutex};

#[derive(Debug, thiserror::Error)]
#[error("mock error: {0}")]
pub struct MockError(pub String);

/// Timer whose state is set by the test.  `None` means "unreachable".
#[derive(Debug, Clone)]
pub struct MockTimer {
    snapshot: Arc<Mutex<Option<TimerSnapshot>>>,
    queries: Arc<Mutex<usize>>,
}

impl MockTimer {
    pub fn new(state: TimerState) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Some(TimerSnapshot {
                state,
                is_paused: false,
                elapsed: 0.0,
                duration: 1500.0,
            }))),
            queries: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_state(&self, state: TimerState, is_paused: bool) {
        *self.snapshot.lock().unwrap() = Some(TimerSnapshot {
            state,
            is_paused,
            elapsed: 0.0,
            duration: 1500.0,
        });
    }

    pub fn set_unreachable(&self) {
        *self.snapshot.lock().unwrap() = None;
    }

    pub fn queries(&self) -> usize {
        *self.queries.lock().unwrap()
    }
}

impl TimerService for MockTimer {
    type Error = MockError;

    fn snapshot(&self) -> Result<TimerSnapshot, MockError> {
        *self.queries.lock().unwrap() += 1;
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MockError("timer unreachable".into()))
    }
}

/// Window manager that records every `activate` call.
#[derive(Debug, Clone)]
pub struct RecordingWm {
    focused: String,
    activations: Arc<Mutex<Vec<String>>>,
}

impl RecordingWm {
    pub fn new(focused: &str) -> Self {
        Self {
            focused: focused.to_string(),
            activations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().unwrap().clone()
    }
}

impl WindowManager for RecordingWm {
    type Error = MockError;

    fn focused_workspace_name(&self) -> Result<String, MockError> {
        Ok(self.focused.clone())
    }

    fn activate(&self, name: &str) -> Result<(), MockError> {
        self.activations.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCall {
    Pause,
    Resume,
}

/// Notification gate that records calls and tracks the resulting state.
#[derive(Debug, Clone, Default)]
pub struct RecordingGate {
    calls: Arc<Mutex<Vec<GateCall>>>,
    paused: Arc<Mutex<bool>>,
    failing: bool,
}

impl RecordingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate whose calls are recorded but always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap()
    }

    fn record(&self, call: GateCall) -> Result<(), MockError> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(MockError("notification daemon gone".into()));
        }
        *self.paused.lock().unwrap() = call == GateCall::Pause;
        Ok(())
    }
}

impl NotificationGate for RecordingGate {
    type Error = MockError;

    fn pause(&self) -> Result<(), MockError> {
        self.record(GateCall::Pause)
    }

    fn resume(&self) -> Result<(), MockError> {
        self.record(GateCall::Resume)
    }
}

/// Warning surface that records every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    messages: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl WarningSurface for RecordingSurface {
    type Error = MockError;

    fn show(&self, severity: Severity, message: &str) -> Result<(), MockError> {
        self.messages
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
        Ok(())
    }
}

/// Source that emits a fixed sequence of events and then ends.
pub struct VecSource<E> {
    events: Vec<E>,
}

impl<E> VecSource<E> {
    pub fn new(events: Vec<E>) -> Self {
        Self { events }
    }
}

impl<E: Send + 'static> EventSource for VecSource<E> {
    type Event = E;
    type Error = MockError;

    fn run(&mut self, sink: mpsc::Sender<E>) -> Result<(), MockError> {
        for event in self.events.drain(..) {
            let _ = sink.send(event);
        }
        Ok(())
    }
}

/// Source that emits nothing and stays alive until `release` is dropped or
/// signalled.
pub struct HeldSource<E> {
    release: mpsc::Receiver<()>,
    _event: std::marker::PhantomData<fn() -> E>,
}

impl<E> HeldSource<E> {
    pub fn new() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                release: rx,
                _event: std::marker::PhantomData,
            },
            tx,
        )
    }
}

impl<E: Send + 'static> EventSource for HeldSource<E> {
    type Event = E;
    type Error = MockError;

    fn run(&mut self, _sink: mpsc::Sender<E>) -> Result<(), MockError> {
        let _ = self.release.recv();
        Ok(())
    }
}

/// Source that fails immediately, like a dropped connection.
pub struct FailingSource<E> {
    _event: std::marker::PhantomData<fn() -> E>,
}

impl<E> FailingSource<E> {
    pub fn new() -> Self {
        Self {
            _event: std::marker::PhantomData,
        }
    }
}

impl<E: Send + 'static> EventSource for FailingSource<E> {
    type Event = E;
    type Error = MockError;

    fn run(&mut self, _sink: mpsc::Sender<E>) -> Result<(), MockError> {
        Err(MockError("connection lost".into()))
    }
}
