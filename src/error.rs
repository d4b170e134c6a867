//! Error types for the ByteBrew cache simulator

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a simulation
///
/// Busy submissions, removal of absent keys and repeated resets are not
/// errors; those are reported as no-ops by the controller.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Order for an item that is not on the menu
    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    /// No async runtime available to schedule timed phases
    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse error
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
