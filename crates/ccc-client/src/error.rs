//! Error types for service clients.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the identity service or a document store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// A service endpoint could not be turned into a URL.
    #[error("invalid service URL {0}")]
    InvalidUrl(String),

    /// A response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Local file metadata needed for a request was unavailable.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content identifier is already registered.
    #[error("the ccc_id {0} is already registered")]
    AlreadyRegistered(String),

    #[error("unknown site {0}; valid sites are: central, ohsu, dfci, oicr")]
    UnknownSite(String),

    #[error("uuid strategy {0} is not supported; use SHA-1, MD5 or RANDOM")]
    InvalidStrategy(String),
}

impl ClientError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns whether the failure happened on the wire rather than in the
    /// request or response contents.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_transport_errors() {
        let err = ClientError::Status {
            method: "GET",
            url: "http://localhost:9200/p-sample/sample/k".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert!(err.is_transport());
        assert!(err.to_string().contains("status 500"));
        assert!(!ClientError::UnknownSite("mars".to_string()).is_transport());
    }
}
