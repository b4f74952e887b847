//! Error types for the stream resolution pipeline

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving streams.
///
/// Only the orchestrator sees these; it logs them and returns an empty
/// result list, so callers of [`crate::EightStream::get_streams`] never do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure: DNS, connection, timeout or body read
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Malformed JSON or manifest
    #[error("parse error: {0}")]
    Parse(String),

    /// Expected markup or script content was not found
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// A parsed structure lacks a required key
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// Season, episode or file selection miss
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input
    #[error("validation failed: {0}")]
    Validation(String),
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for transport and status failures.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_become_parse_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(!err.is_network());
    }

    #[test]
    fn display_names_the_missing_field() {
        assert_eq!(Error::MissingField("key").to_string(), "missing field `key`");
    }
}
