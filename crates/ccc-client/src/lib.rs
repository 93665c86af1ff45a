//! Clients for the services an import talks to.
//!
//! - [`IdentityService`]: assigns and resolves content identifiers
//!   ([`DtsClient`] over HTTP).
//! - [`DocumentStore`]: key-addressed document storage
//!   ([`ElasticsearchStore`], [`EveMongoStore`]).
//!
//! [`MemoryDocumentStore`] and [`MemoryIdentityService`] stand in for both
//! services in dry runs and tests.

#![deny(unsafe_code)]

pub mod config;
pub mod dts;
pub mod error;
mod http;
pub mod identity;
pub mod memory;
pub mod search;
pub mod store;
pub mod submission;

pub use config::{
    AUTH_TOKEN_ENV_VAR, DtsConfig, SearchConfig, SubmissionConfig, parse_auth_token,
};
pub use dts::{DtsClient, RegistrationPayload};
pub use error::{ClientError, Result};
pub use identity::{
    IdentityRecord, IdentityService, UuidStrategy, dir_name, file_name, infer_ccc_id,
    placeholder_id, site_url,
};
pub use memory::{MemoryDocumentStore, MemoryIdentityService};
pub use search::ElasticsearchStore;
pub use store::DocumentStore;
pub use submission::EveMongoStore;
