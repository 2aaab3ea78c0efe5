//! Error types for the connectivity core.
//!
//! Initialization failures are fatal and propagate to the caller; transient
//! connectivity drops never surface here, they are absorbed by the reconnect
//! reactions in [`crate::link`] and [`crate::mqtt::session`].

use std::error::Error;
use std::fmt;

/// Failure while bringing up the Wi-Fi station. Only one-time initialization
/// can fail; once the link is started, drops are handled by reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Network stack or driver initialization failed.
    Init(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Init(reason) => write!(f, "station initialization failed: {}", reason),
        }
    }
}

impl Error for LinkError {}

/// Failure in the MQTT session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session object construction failed; fatal, like any init error.
    Init(String),
    /// Publish attempted before the session was started.
    NotStarted,
    /// A client handle was already attached.
    AlreadyStarted,
    /// The client did not accept the message (no message id assigned).
    Rejected,
    /// The underlying client reported a send error.
    Transport(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Init(reason) => write!(f, "session initialization failed: {}", reason),
            SessionError::NotStarted => write!(f, "session not started"),
            SessionError::AlreadyStarted => write!(f, "session already started"),
            SessionError::Rejected => write!(f, "publish rejected by client"),
            SessionError::Transport(reason) => write!(f, "publish failed: {}", reason),
        }
    }
}

impl Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(SessionError::NotStarted.to_string(), "session not started");
        assert_eq!(
            LinkError::Init("no heap".to_string()).to_string(),
            "station initialization failed: no heap"
        );
    }
}
