use serde::Serialize;
use thiserror::Error;

/// Structured error type for the console. Nothing here is fatal: the
/// dispatcher reports every variant through the logging callback and moves on,
/// so front ends can match on the code instead of parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", content = "detail")]
pub enum ConsoleError {
    #[error("{owner} no longer exists")]
    StaleOwner { owner: String },
    #[error("Cannot set a constant field {member}")]
    ImmutableTarget { member: String },
    #[error("property {member} does not have a getter!")]
    MissingGetter { member: String },
    #[error("property {member} does not have a setter!")]
    MissingSetter { member: String },
    #[error("{message}")]
    Invocation { message: String },
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("Settings error: {message}")]
    Settings { message: String },
}

impl ConsoleError {
    pub fn invocation(message: impl Into<String>) -> Self {
        ConsoleError::Invocation {
            message: message.into(),
        }
    }

    /// Errors that mean the owning object went away, not that the command failed.
    pub fn is_stale(&self) -> bool {
        matches!(self, ConsoleError::StaleOwner { .. })
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Settings {
            message: e.to_string(),
        }
    }
}

impl From<String> for ConsoleError {
    fn from(s: String) -> Self {
        ConsoleError::Invocation { message: s }
    }
}

impl From<&str> for ConsoleError {
    fn from(s: &str) -> Self {
        ConsoleError::Invocation {
            message: s.to_string(),
        }
    }
}
