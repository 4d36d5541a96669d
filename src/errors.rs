//! Error types shared across the relay.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all infrastructure failure modes.
///
/// Transport timeouts and errors for an in-flight request are not
/// represented here: they are ordinary outcomes handled by the dispatcher.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or credential lookup failure.
    Config(String),
    /// HTTP client construction or request setup failure.
    Transport(String),
    /// Host bridge framing or protocol failure.
    Bridge(String),
    /// Dispatch service is unavailable (actor stopped or inbox closed).
    Dispatch(String),
    /// File-system or stream I/O failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Bridge(msg) => write!(f, "bridge: {msg}"),
            Self::Dispatch(msg) => write!(f, "dispatch: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Reasons a `lookup` command is refused before anything is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejection {
    /// The invoking session lacks the configured lookup permission.
    PermissionDenied,
    /// The command was issued without a search term.
    EmptyArgument,
}

impl CommandRejection {
    /// Fixed notice sent back to the invoking session.
    #[must_use]
    pub fn notice(self) -> &'static str {
        match self {
            Self::PermissionDenied => "You do not have permission to run the lookup command",
            Self::EmptyArgument => "Usage : /lookup <callsign>|<ipaddress>",
        }
    }
}

impl Display for CommandRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::EmptyArgument => f.write_str("empty argument"),
        }
    }
}
