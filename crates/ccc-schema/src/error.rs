#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema document {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema for domain {domain}: {message}")]
    Invalid { domain: String, message: String },

    #[error("unknown domain: {0}")]
    UnknownDomain(String),
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(domain: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            domain: domain.to_string(),
            message: message.into(),
        }
    }

    /// True for every failure to obtain a usable schema document.
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::UnknownDomain(_))
    }
}
