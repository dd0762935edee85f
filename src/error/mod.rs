//! Error types and handlers for pruning runs
//!
//! Only conditions that abort a run are errors here. Failures confined to a
//! single deletion group are values, see [`crate::prune::executor::DeletionFailure`].

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrunerError>;

#[derive(Debug, Clone, Error)]
pub enum PrunerError {
    /// Login rejected by the registry
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// A stage that needs a token ran before login
    #[error("Not authenticated: login must succeed before {0}")]
    NotAuthenticated(String),
    /// An enumerated tag has neither a direct nor a nested image digest
    #[error("Missing digest: {0}")]
    MissingDigest(String),
    /// An enumerated tag carries an unparsable last-updated value
    #[error("Malformed timestamp for {tag}: '{value}' ({reason})")]
    MalformedTimestamp {
        tag: String,
        value: String,
        reason: String,
    },
    /// Registry answered with a non-success status
    #[error("Registry error: {0}")]
    Registry(String),
    /// Network related errors
    #[error("Network error: {0}")]
    Network(String),
    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
    /// Invalid configuration
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for PrunerError {
    fn from(err: reqwest::Error) -> Self {
        handlers::NetworkErrorHandler::handle_network_error(&err, "registry request")
    }
}

impl From<serde_json::Error> for PrunerError {
    fn from(err: serde_json::Error) -> Self {
        PrunerError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for PrunerError {
    fn from(err: url::ParseError) -> Self {
        PrunerError::Validation(err.to_string())
    }
}
