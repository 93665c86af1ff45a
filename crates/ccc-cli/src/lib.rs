//! Command-line support for the CCC client: logging setup and result tables.

#![deny(unsafe_code)]

pub mod logging;
pub mod summary;
