//! Translates i3 / sway `workspace` events into [`WorkspaceFocusEvent`]s.
//!
//! The source opens its own IPC connection, sends
//! `SUBSCRIBE ["workspace"]`, and then reads events until the window manager
//! closes the socket.  Only `change: "focus"` events are forwarded; `init`,
//! `empty`, `rename` and friends are ignored.
//!
//! A payload that cannot be decoded is logged and skipped.  Losing the
//! connection ends the source with an error.

use crate::error::ServiceError;
use crate::event::WorkspaceFocusEvent;
use crate::i3::ipc::{read_message, write_message, EVENT_WORKSPACE, SUBSCRIBE};
use crate::i3::wm::WorkspaceJson;
use crate::traits::EventSource;
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::mpsc;

/// An [`EventSource`] of workspace focus changes.
pub struct I3FocusSource {
    socket: PathBuf,
}

impl I3FocusSource {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }
}

/// Payload of a workspace event.
#[derive(Deserialize)]
struct WorkspaceEventJson {
    change: String,
    #[serde(default)]
    current: Option<WorkspaceJson>,
}

#[derive(Deserialize)]
struct SubscribeReplyJson {
    success: bool,
}

/// Decode one workspace event payload.
///
/// Returns `Ok(None)` for events that are not focus changes.
fn parse_workspace_event(payload: &[u8]) -> Result<Option<WorkspaceFocusEvent>, ServiceError> {
    let event: WorkspaceEventJson = serde_json::from_slice(payload)
        .map_err(|e| ServiceError::Protocol(format!("parse workspace event: {}", e)))?;
    if event.change != "focus" {
        return Ok(None);
    }
    let current = event
        .current
        .ok_or_else(|| ServiceError::Protocol("focus event without current workspace".into()))?;
    Ok(Some(WorkspaceFocusEvent::new(current.num, current.name)))
}

impl EventSource for I3FocusSource {
    type Event = WorkspaceFocusEvent;
    type Error = ServiceError;

    /// Subscribe and forward focus changes.
    ///
    /// This method **blocks** until the window manager closes the
    /// connection.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<WorkspaceFocusEvent>) -> Result<(), Self::Error> {
        let mut stream = UnixStream::connect(&self.socket).map_err(|e| {
            ServiceError::ServiceUnavailable(format!("connect to {}: {}", self.socket.display(), e))
        })?;
        write_message(&mut stream, SUBSCRIBE, br#"["workspace"]"#)
            .map_err(|e| ServiceError::ServiceUnavailable(format!("write: {}", e)))?;
        info!("subscribed to workspace events on {}", self.socket.display());

        loop {
            let (kind, payload) = match read_message(&mut stream)? {
                Some(message) => message,
                None => {
                    warn!("i3 event stream ended");
                    return Ok(());
                }
            };

            match kind {
                SUBSCRIBE => {
                    let reply: SubscribeReplyJson = serde_json::from_slice(&payload)
                        .map_err(|e| ServiceError::Protocol(format!("subscribe reply: {}", e)))?;
                    if !reply.success {
                        return Err(ServiceError::CommandFailed(
                            "subscribe to workspace events rejected".into(),
                        ));
                    }
                }
                EVENT_WORKSPACE => match parse_workspace_event(&payload) {
                    Ok(Some(event)) => {
                        debug!("workspace focus: {} ({})", event.name, event.num);
                        if sink.send(event).is_err() {
                            info!("sink closed, shutting down");
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => error!("bad workspace event: {}", e),
                },
                other => debug!("ignoring message type {:#x}", other),
            }
        }
    }
}
