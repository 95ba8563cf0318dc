//! Error taxonomy shared by the concrete backends.
//!
//! Every backend (session bus, i3 IPC, nagbar) reports failures through
//! [`ServiceError`] so the daemon can apply one propagation policy to all of
//! them: fail open while evaluating workspace policy, swallow after logging in
//! the timer handler, exit at start-up.

/// Failure talking to one of the external services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached, or the connection was lost.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A reply or event payload did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A command could not be submitted or was rejected by the service.
    #[error("command failed: {0}")]
    CommandFailed(String),
}

impl From<zbus::Error> for ServiceError {
    fn from(e: zbus::Error) -> Self {
        match e {
            zbus::Error::InputOutput(_) | zbus::Error::Address(_) | zbus::Error::Handshake(_) => {
                ServiceError::ServiceUnavailable(e.to_string())
            }
            zbus::Error::MethodError(..) | zbus::Error::FDO(_) => {
                ServiceError::CommandFailed(e.to_string())
            }
            _ => ServiceError::Protocol(e.to_string()),
        }
    }
}
