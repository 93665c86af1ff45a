use ccc_client::ClientError;
use ccc_ingest::IngestError;
use ccc_model::{DataType, ModelError};
use ccc_schema::SchemaError;
use thiserror::Error;

/// Every way normalizing or importing a record can fail.
///
/// Any error aborts the current row and with it the whole batch.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("cannot convert field {field} to type {data_type} for value [{value}]")]
    FieldType {
        field: String,
        data_type: DataType,
        value: String,
    },

    #[error("ccc_id {ccc_id} does not match the registered file: {reason}")]
    IdentityMismatch { ccc_id: String, reason: String },

    #[error("the ccc_id {ccc_id} was already present in the DTS")]
    IdentityRegistrationConflict { ccc_id: String },

    #[error("DTS registration for a {domain} record requires a filepath or url")]
    MissingResourcePath { domain: String },

    #[error("unable to find existing resource with id: {ccc_id}")]
    InheritedResourceNotFound { ccc_id: String },

    #[error("property [{0}] must have the form Field:Value")]
    InvalidProperty(String),
}

impl ImportError {
    /// Returns whether a backing service failed rather than the row itself.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Client(error) if error.is_transport())
    }

    pub(crate) fn mismatch(ccc_id: &str, reason: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            ccc_id: ccc_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_service_failures_are_transport_errors() {
        let status = ImportError::Client(ClientError::Status {
            method: "PUT",
            url: "http://localhost:9200/p-sample/sample/k".to_string(),
            status: 503,
            body: String::new(),
        });
        assert!(status.is_transport());
        assert!(!ImportError::Client(ClientError::UnknownSite("mars".to_string())).is_transport());
        assert!(!ImportError::InvalidProperty("x".to_string()).is_transport());
    }
}
