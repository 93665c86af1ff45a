//! Record normalization and import for CCC domains.
//!
//! - **normalizer**: alias resolution, coercion, identity and bookkeeping for
//!   one row
//! - **denormalize**: merging of upstream domain documents
//! - **importer**: ordered batch import of TSV files
//! - **publish**: single resource records built from a path and properties

#![deny(unsafe_code)]

pub mod coerce;
pub mod context;
pub mod denormalize;
pub mod error;
pub mod identity;
pub mod importer;
pub mod normalizer;
pub mod publish;

pub use context::{IdentityPolicy, NormalizeContext};
pub use denormalize::Denormalizer;
pub use error::{ImportError, Result};
pub use identity::{IdentityResolver, resource_path};
pub use importer::{BatchImporter, ImportMode, ImportedRecord};
pub use normalizer::RowNormalizer;
pub use publish::{ResourceRequest, parse_property, publish_resource};
