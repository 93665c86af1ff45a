#![deny(unsafe_code)]

pub mod error;
pub mod tsv;

pub use error::IngestError;
pub use tsv::{RawRow, TsvReader, read_tsv};
