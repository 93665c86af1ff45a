#![deny(unsafe_code)]

pub mod alias;
pub mod error;
pub mod registry;

pub use crate::alias::AliasResolver;
pub use crate::error::SchemaError;
pub use crate::registry::{DOMAINS_FILE_ENV_VAR, SchemaRegistry, default_domains_path};
