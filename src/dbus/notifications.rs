//! [`NotificationGate`] that pauses and resumes dunst.
//!
//! dunst treats a notification whose summary is `DUNST_COMMAND_PAUSE` or
//! `DUNST_COMMAND_RESUME` as a control message instead of displaying it.  The
//! reply (a notification id) carries nothing useful and is dropped.

use crate::error::ServiceError;
use crate::traits::NotificationGate;
use log::debug;
use std::collections::HashMap;
use zbus::blocking::Connection;
use zbus::zvariant::Value;

pub const BUS_NAME: &str = "org.freedesktop.Notifications";
pub const OBJECT_PATH: &str = "/org/freedesktop/Notifications";
pub const INTERFACE: &str = "org.freedesktop.Notifications";

pub const PAUSE: &str = "DUNST_COMMAND_PAUSE";
pub const RESUME: &str = "DUNST_COMMAND_RESUME";

/// Gate backed by the freedesktop notification service.
#[derive(Clone)]
pub struct DunstGate {
    conn: Connection,
}

impl DunstGate {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn signal(&self, action: &str) -> Result<(), ServiceError> {
        debug!("sending {}", action);
        let actions: Vec<&str> = Vec::new();
        let hints: HashMap<&str, Value<'_>> = HashMap::new();
        self.conn.call_method(
            Some(BUS_NAME),
            OBJECT_PATH,
            Some(INTERFACE),
            "Notify",
            // app_name, replaces_id, app_icon, summary, body, actions, hints, timeout
            &("", 0u32, "", action, "", actions, hints, 0i32),
        )?;
        Ok(())
    }
}

impl NotificationGate for DunstGate {
    type Error = ServiceError;

    fn pause(&self) -> Result<(), Self::Error> {
        self.signal(PAUSE)
    }

    fn resume(&self) -> Result<(), Self::Error> {
        self.signal(RESUME)
    }
}
