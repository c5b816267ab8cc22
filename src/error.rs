//! Error types
//!
//! Collisions and game over are not errors; they are phase transitions
//! reported through [`crate::sim::FrameResult`].

/// Configuration errors (raised at startup, before the first tick)
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range or inconsistent with another value
    #[error("Invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// High score persistence errors
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded or encoded
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
