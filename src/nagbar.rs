//! [`WarningSurface`] that pops up `i3-nagbar` or `swaynag`.
//!
//! The program is started directly, never through a shell, so workspace
//! names cannot inject anything.  The child is reaped on a background thread;
//! the caller never waits for the user to dismiss the bar.

use crate::error::ServiceError;
use crate::traits::{Severity, WarningSurface};
use log::{debug, warn};
use std::process::{Command, Stdio};

/// Nagbar launcher.
#[derive(Debug, Clone)]
pub struct Nagbar {
    program: String,
}

impl Nagbar {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `swaynag` under sway, `i3-nagbar` otherwise.
    pub fn detect() -> Self {
        Self::new(default_program(std::env::var_os("SWAYSOCK").is_some()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, severity: Severity, message: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-t")
            .arg(severity.as_str())
            .arg("-m")
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        cmd
    }
}

fn default_program(sway: bool) -> &'static str {
    if sway {
        "swaynag"
    } else {
        "i3-nagbar"
    }
}

impl WarningSurface for Nagbar {
    type Error = ServiceError;

    fn show(&self, severity: Severity, message: &str) -> Result<(), Self::Error> {
        debug!("{} -t {} -m {:?}", self.program, severity.as_str(), message);
        let mut child = self
            .command(severity, message)
            .spawn()
            .map_err(|e| ServiceError::CommandFailed(format!("spawn {}: {}", self.program, e)))?;
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                warn!("waiting for nagbar: {}", e);
            }
        });
        Ok(())
    }
}
