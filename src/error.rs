//! Engine error type
//!
//! Win and loss are not errors; they come back as [`crate::sim::Outcome`].

use std::fmt;
use std::time::Duration;

/// Everything that can go wrong before or around a session
#[derive(Debug)]
pub enum EngineError {
    /// A configuration value failed validation
    InvalidConfig { field: &'static str, reason: String },
    /// Config file could not be read
    ConfigIo(std::io::Error),
    /// Config file is not valid JSON for [`crate::GameConfig`]
    ConfigParse(serde_json::Error),
    /// Preloading did not finish before the deadline
    AssetTimeout {
        loaded: usize,
        required: usize,
        waited: Duration,
    },
    /// A loader reported that an asset cannot be loaded
    AssetFailed { name: String, reason: String },
    /// Terminal setup or keyboard access failed
    Terminal(std::io::Error),
    /// Operation called in the wrong loop state
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig { field, reason } => {
                write!(f, "invalid config `{field}`: {reason}")
            }
            EngineError::ConfigIo(e) => write!(f, "failed to read config: {e}"),
            EngineError::ConfigParse(e) => write!(f, "failed to parse config: {e}"),
            EngineError::AssetTimeout {
                loaded,
                required,
                waited,
            } => write!(
                f,
                "asset preload timed out after {:.1}s ({loaded}/{required} ready)",
                waited.as_secs_f32()
            ),
            EngineError::Terminal(e) => write!(f, "terminal error: {e}"),
            EngineError::AssetFailed { name, reason } => {
                write!(f, "failed to load asset `{name}`: {reason}")
            }
            EngineError::InvalidState { expected, actual } => {
                write!(f, "game loop is {actual}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::ConfigIo(e) => Some(e),
            EngineError::ConfigParse(e) => Some(e),
            EngineError::Terminal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::ConfigIo(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::ConfigParse(e)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
