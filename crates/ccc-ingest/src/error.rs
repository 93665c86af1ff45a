use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("line {line}: expected {expected} cells to match the header, found {found}")]
    RowShape {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: row cannot be empty")]
    EmptyRow { line: u64 },
}
