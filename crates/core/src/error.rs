//! Error types for the startup analyzer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the startup analyzer.
#[derive(Error, Debug)]
pub enum Error {
    /// A required aggregate record was absent; the model cannot be built.
    #[error("Missing required aggregate: no {0} record in startup messages")]
    MissingRequiredAggregate(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup document is unusable (e.g. no message list).
    #[error("Data error: {0}")]
    Data(String),

    /// A model consumer could not write its output.
    #[error("Export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing-aggregate error for the given record kind.
    pub fn missing_aggregate(kind: &'static str) -> Self {
        Error::MissingRequiredAggregate(kind)
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an export error.
    pub fn export(msg: impl Into<String>) -> Self {
        Error::Export(msg.into())
    }

    /// Whether this error aborted the model build itself.
    pub fn is_fatal_build_error(&self) -> bool {
        matches!(self, Error::MissingRequiredAggregate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_aggregate_message() {
        let err = Error::missing_aggregate("HeroPush");
        assert_eq!(
            err.to_string(),
            "Missing required aggregate: no HeroPush record in startup messages"
        );
        assert!(err.is_fatal_build_error());
    }

    #[test]
    fn test_other_errors_not_fatal_build_errors() {
        assert!(!Error::data("bad").is_fatal_build_error());
        assert!(!Error::export("disk full").is_fatal_build_error());
    }
}
