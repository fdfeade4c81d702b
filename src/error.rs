use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimError` and maps other errors to
/// convert to a `SimError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// A configuration value is out of range or inconsistent.
    InvalidConfig(String),
    /// An operation was attempted on state it is not defined for, e.g. acting on a dead
    /// agent or computing a fraction of an empty population.
    DegenerateState(String),
    GraphError(String),
}

impl SimError {
    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        SimError::DegenerateState(message.into())
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        SimError::InvalidConfig(message.into())
    }

    #[must_use]
    pub fn is_degenerate_state(&self) -> bool {
        matches!(self, SimError::DegenerateState(_))
    }
}

impl From<io::Error> for SimError {
    fn from(error: io::Error) -> Self {
        SimError::IoError(error)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(error: serde_json::Error) -> Self {
        SimError::JsonError(error)
    }
}

impl From<String> for SimError {
    fn from(error: String) -> Self {
        SimError::InvalidConfig(error)
    }
}

impl From<&str> for SimError {
    fn from(error: &str) -> Self {
        SimError::InvalidConfig(error.to_string())
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::IoError(e) => Some(e),
            SimError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::IoError(e) => write!(f, "I/O error: {e}"),
            SimError::JsonError(e) => write!(f, "JSON error: {e}"),
            SimError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            SimError::DegenerateState(msg) => write!(f, "degenerate state: {msg}"),
            SimError::GraphError(msg) => write!(f, "contact graph error: {msg}"),
        }
    }
}
