#![deny(unsafe_code)]

pub mod error;
pub mod key;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{ModelError, Result};
pub use key::{Collection, StorageKey};
pub use record::{
    CONTENT_ID_FIELD, NormalizedRecord, PROJECT_CODE_FIELD, SITE_ID_FIELD, TYPE_FIELD,
};
pub use schema::{CollectionSpec, DataType, DomainSchema, FieldDescriptor};
pub use value::Value;
