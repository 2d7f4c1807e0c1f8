//! Error types for cfgsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from cfgsync-core
    #[error(transparent)]
    Core(#[from] cfgsync_core::Error),

    /// Section could not be rendered as JSON
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Section could not be rendered as YAML
    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
