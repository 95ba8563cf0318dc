//! [`WindowManager`] implementation backed by i3 / sway IPC.
//!
//! Talks to the window manager directly through its Unix socket, one
//! short-lived connection per request.

use crate::error::ServiceError;
use crate::i3::ipc::{self, GET_WORKSPACES, RUN_COMMAND};
use crate::traits::WindowManager;
use serde::Deserialize;
use std::path::PathBuf;

/// i3- or sway-backed window manager.
#[derive(Debug, Clone)]
pub struct I3Wm {
    socket: PathBuf,
}

impl I3Wm {
    /// Use the socket at `socket`.
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Run a raw command and check every result for `success`.
    pub fn run_command(&self, command: &str) -> Result<(), ServiceError> {
        let body = ipc::request(&self.socket, RUN_COMMAND, command)?;
        let results: Vec<CommandResultJson> = serde_json::from_slice(&body)
            .map_err(|e| ServiceError::Protocol(format!("parse command reply: {}", e)))?;
        match results.into_iter().find(|r| !r.success) {
            Some(failed) => Err(ServiceError::CommandFailed(format!(
                "{:?}: {}",
                command,
                failed.error.unwrap_or_else(|| "unknown error".into())
            ))),
            None => Ok(()),
        }
    }

    /// All workspaces, in the order the window manager reports them.
    pub fn workspaces(&self) -> Result<Vec<WorkspaceJson>, ServiceError> {
        let body = ipc::request(&self.socket, GET_WORKSPACES, "")?;
        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::Protocol(format!("parse workspaces: {}", e)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of a workspace object from `GET_WORKSPACES` and workspace events.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceJson {
    pub num: i32,
    pub name: String,
    #[serde(default)]
    pub focused: bool,
}

/// One entry of a `RUN_COMMAND` reply.
#[derive(Deserialize)]
struct CommandResultJson {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Quote a workspace name for the i3 command parser.
fn quote(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

//  WindowManager implementation

impl WindowManager for I3Wm {
    type Error = ServiceError;

    fn focused_workspace_name(&self) -> Result<String, Self::Error> {
        self.workspaces()?
            .into_iter()
            .find(|w| w.focused)
            .map(|w| w.name)
            .ok_or_else(|| ServiceError::Protocol("no focused workspace".into()))
    }

    fn activate(&self, name: &str) -> Result<(), Self::Error> {
        self.run_command(&format!("workspace {}", quote(name)))
    }
}
