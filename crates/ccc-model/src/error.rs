use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("row lacks key field {field} required by domain {domain}")]
    MissingKeyField { domain: String, field: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
