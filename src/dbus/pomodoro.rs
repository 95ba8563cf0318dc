//! GNOME Pomodoro over the session bus.
//!
//! [`GnomePomodoro`] answers snapshot queries and sends control commands;
//! [`PomodoroStateSource`] turns the `StateChanged` signal into
//! [`TimerStateChange`]s.  Both share one blocking session-bus connection,
//! which accepts calls from several threads at once.

use crate::control::TimerCommand;
use crate::error::ServiceError;
use crate::event::{TimerSnapshot, TimerState, TimerStateChange};
use crate::traits::{EventSource, TimerService};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::mpsc;
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::OwnedValue;

pub const BUS_NAME: &str = "org.gnome.Pomodoro";
pub const OBJECT_PATH: &str = "/org/gnome/Pomodoro";
pub const INTERFACE: &str = "org.gnome.Pomodoro";
const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

type Dict = HashMap<String, OwnedValue>;

fn unavailable(e: zbus::Error) -> ServiceError {
    ServiceError::ServiceUnavailable(format!("gnome-pomodoro: {}", e))
}

/// Client for the GNOME Pomodoro timer.
#[derive(Clone)]
pub struct GnomePomodoro {
    conn: Connection,
}

impl GnomePomodoro {
    /// Connect to the session bus.
    pub fn connect() -> Result<Self, ServiceError> {
        let conn = Connection::session()
            .map_err(|e| ServiceError::ServiceUnavailable(format!("session bus: {}", e)))?;
        Ok(Self::with_connection(conn))
    }

    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Invoke a control method such as `Start` or `Pause`.
    pub fn send(&self, command: TimerCommand) -> Result<(), ServiceError> {
        debug!("calling {}.{}", INTERFACE, command.method_name());
        self.conn.call_method(
            Some(BUS_NAME),
            OBJECT_PATH,
            Some(INTERFACE),
            command.method_name(),
            &(),
        )?;
        Ok(())
    }

    /// A source of state changes sharing this client's connection.
    pub fn state_changes(&self) -> PomodoroStateSource {
        PomodoroStateSource {
            timer: self.clone(),
        }
    }
}

impl TimerService for GnomePomodoro {
    type Error = ServiceError;

    fn snapshot(&self) -> Result<TimerSnapshot, Self::Error> {
        let reply = self
            .conn
            .call_method(
                Some(BUS_NAME),
                OBJECT_PATH,
                Some(PROPERTIES_INTERFACE),
                "GetAll",
                &(INTERFACE,),
            )
            .map_err(unavailable)?;
        let props: Dict = reply
            .body()
            .deserialize()
            .map_err(|e| ServiceError::Protocol(format!("GetAll reply: {}", e)))?;
        parse_properties(props)
    }
}

fn take_state(dict: &mut Dict, key: &str) -> Result<TimerState, ServiceError> {
    let value = dict
        .remove(key)
        .ok_or_else(|| ServiceError::Protocol(format!("missing {:?}", key)))?;
    let name = String::try_from(value)
        .map_err(|e| ServiceError::Protocol(format!("{:?} is not a string: {}", key, e)))?;
    name.parse::<TimerState>()
        .map_err(|e| ServiceError::Protocol(e.to_string()))
}

fn get_f64(dict: &Dict, key: &str) -> Result<f64, ServiceError> {
    match dict.get(key) {
        Some(v) => v
            .downcast_ref::<f64>()
            .map_err(|e| ServiceError::Protocol(format!("{:?} is not a double: {}", key, e))),
        None => Err(ServiceError::Protocol(format!("missing {:?}", key))),
    }
}

fn get_bool(dict: &Dict, key: &str) -> Result<Option<bool>, ServiceError> {
    dict.get(key)
        .map(|v| {
            v.downcast_ref::<bool>()
                .map_err(|e| ServiceError::Protocol(format!("{:?} is not a boolean: {}", key, e)))
        })
        .transpose()
}

/// Build a snapshot from the `org.gnome.Pomodoro` properties.
pub(crate) fn parse_properties(mut props: Dict) -> Result<TimerSnapshot, ServiceError> {
    Ok(TimerSnapshot {
        state: take_state(&mut props, "State")?,
        is_paused: get_bool(&props, "IsPaused")?.unwrap_or(false),
        elapsed: get_f64(&props, "Elapsed")?,
        duration: get_f64(&props, "StateDuration")?,
    })
}

/// Build a snapshot from one `StateChanged` dictionary.
///
/// The signal carries `name`, `elapsed` and `duration`.  A state that has
/// just been entered is running, so a missing `is-paused` means `false`.
pub(crate) fn parse_state_dict(mut dict: Dict) -> Result<TimerSnapshot, ServiceError> {
    let state = take_state(&mut dict, "name")?;
    Ok(TimerSnapshot {
        state,
        is_paused: get_bool(&dict, "is-paused")?.unwrap_or(false),
        elapsed: get_f64(&dict, "elapsed").unwrap_or(0.0),
        duration: get_f64(&dict, "duration").unwrap_or(0.0),
    })
}

/// Decode the two dictionaries of a `StateChanged` signal.
///
/// Only `current` has to be valid.  A malformed `previous` is logged and
/// replaced with an idle snapshot, since handlers react to the current
/// state alone.
pub(crate) fn parse_state_changed(
    current: Dict,
    previous: Dict,
) -> Result<TimerStateChange, ServiceError> {
    let current = parse_state_dict(current)?;
    let previous = parse_state_dict(previous).unwrap_or_else(|e| {
        debug!("ignoring bad previous state: {}", e);
        TimerSnapshot::default()
    });
    Ok(TimerStateChange { current, previous })
}

/// The transition forwarded right after subscribing: the current snapshot,
/// reported as a change from itself.
///
/// Sent once the signal match is in place, so no transition can fall
/// between the snapshot and the first live signal.
pub fn initial_change<T: TimerService>(timer: &T) -> Result<TimerStateChange, T::Error> {
    let snapshot = timer.snapshot()?;
    Ok(TimerStateChange {
        previous: snapshot.clone(),
        current: snapshot,
    })
}

/// An [`EventSource`] of timer state transitions.
///
/// The first event is always [`initial_change`]; live `StateChanged`
/// signals follow.
pub struct PomodoroStateSource {
    timer: GnomePomodoro,
}

impl EventSource for PomodoroStateSource {
    type Event = TimerStateChange;
    type Error = ServiceError;

    /// Listen for `StateChanged` and forward every transition.
    ///
    /// This method **blocks** until the bus connection goes away.  Run it on
    /// a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<TimerStateChange>) -> Result<(), Self::Error> {
        let proxy = Proxy::new(self.timer.connection(), BUS_NAME, OBJECT_PATH, INTERFACE)
            .map_err(unavailable)?;
        let signals = proxy.receive_signal("StateChanged").map_err(unavailable)?;
        info!("subscribed to {}.StateChanged", INTERFACE);

        let initial = initial_change(&self.timer)?;
        info!("initial timer state: {}", initial.current.state);
        if sink.send(initial).is_err() {
            return Ok(());
        }

        for message in signals {
            let decoded = message
                .body()
                .deserialize::<(Dict, Dict)>()
                .map_err(|e| ServiceError::Protocol(format!("StateChanged body: {}", e)))
                .and_then(|(current, previous)| parse_state_changed(current, previous));
            match decoded {
                Ok(change) => {
                    debug!(
                        "StateChanged: {} -> {}",
                        change.previous.state, change.current.state
                    );
                    if sink.send(change).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Err(e) => error!("bad StateChanged signal: {}", e),
            }
        }

        warn!("session bus signal stream ended");
        Err(ServiceError::ServiceUnavailable(
            "session bus connection lost".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTimer;
    use zbus::zvariant::Value;

    fn owned(v: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(v).unwrap()
    }

    fn props(state: &str, paused: bool) -> Dict {
        let mut d = Dict::new();
        d.insert("State".into(), owned(Value::from(state)));
        d.insert("IsPaused".into(), owned(Value::from(paused)));
        d.insert("Elapsed".into(), owned(Value::from(65.0f64)));
        d.insert("StateDuration".into(), owned(Value::from(1500.0f64)));
        d
    }

    #[test]
    fn parses_properties() {
        let snap = parse_properties(props("pomodoro", true)).unwrap();
        assert_eq!(
            snap,
            TimerSnapshot {
                state: TimerState::Focus,
                is_paused: true,
                elapsed: 65.0,
                duration: 1500.0,
            }
        );
    }

    #[test]
    fn null_state_is_idle() {
        let snap = parse_properties(props("null", false)).unwrap();
        assert_eq!(snap.state, TimerState::Idle);
    }

    #[test]
    fn unknown_state_is_protocol_error() {
        assert!(matches!(
            parse_properties(props("lunch", false)),
            Err(ServiceError::Protocol(_))
        ));
    }

    #[test]
    fn missing_property_is_protocol_error() {
        let mut d = props("pomodoro", false);
        d.remove("Elapsed");
        assert!(matches!(parse_properties(d), Err(ServiceError::Protocol(_))));
    }

    #[test]
    fn wrongly_typed_property_is_protocol_error() {
        let mut d = props("pomodoro", false);
        d.insert("IsPaused".into(), owned(Value::from("yes")));
        assert!(matches!(parse_properties(d), Err(ServiceError::Protocol(_))));
    }

    #[test]
    fn parses_state_changed_dict() {
        let mut d = Dict::new();
        d.insert("name".into(), owned(Value::from("short-break")));
        d.insert("elapsed".into(), owned(Value::from(0.0f64)));
        d.insert("duration".into(), owned(Value::from(300.0f64)));
        d.insert("timestamp".into(), owned(Value::from(1.7e9f64)));
        let snap = parse_state_dict(d).unwrap();
        assert_eq!(snap.state, TimerState::ShortBreak);
        assert!(!snap.is_paused);
        assert_eq!(snap.duration, 300.0);
    }

    #[test]
    fn bad_previous_state_keeps_current() {
        let mut current = Dict::new();
        current.insert("name".into(), owned(Value::from("pomodoro")));
        let change = parse_state_changed(current, Dict::new()).unwrap();
        assert_eq!(change.current.state, TimerState::Focus);
        assert_eq!(change.previous, TimerSnapshot::default());
    }

    #[test]
    fn bad_current_state_is_protocol_error() {
        let mut previous = Dict::new();
        previous.insert("name".into(), owned(Value::from("pomodoro")));
        assert!(matches!(
            parse_state_changed(Dict::new(), previous),
            Err(ServiceError::Protocol(_))
        ));
    }

    #[test]
    fn initial_change_reports_current_snapshot() {
        let timer = MockTimer::new(TimerState::Focus);
        let change = initial_change(&timer).unwrap();
        assert_eq!(change.current.state, TimerState::Focus);
        assert_eq!(change.current, change.previous);
        assert_eq!(timer.queries(), 1);
    }

    #[test]
    fn initial_change_fails_when_timer_unreachable() {
        let timer = MockTimer::new(TimerState::Idle);
        timer.set_unreachable();
        assert!(initial_change(&timer).is_err());
    }

    #[test]
    fn state_dict_only_needs_name() {
        let mut d = Dict::new();
        d.insert("name".into(), owned(Value::from("pomodoro")));
        let snap = parse_state_dict(d).unwrap();
        assert_eq!(snap.state, TimerState::Focus);
        assert_eq!(snap.elapsed, 0.0);
    }
}
