//! Header-first tab-delimited files.
//!
//! The first non-blank line names the columns; every later line is zipped
//! positionally against it. Quoting is disabled, so a cell is exactly the
//! text between two tabs (trimmed of surrounding whitespace and any BOM).
//! Lines are counted from 1, blank lines included.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IngestError;

/// One data line zipped against the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

/// Streaming reader over the data rows of a TSV file.
///
/// Rows are yielded in file order. Every line after the header must carry
/// cells, a trailing blank line included. The first error ends the iteration.
pub struct TsvReader {
    path: PathBuf,
    headers: Vec<String>,
    lines: BufReader<File>,
    line: u64,
    buf: String,
    failed: bool,
}

impl TsvReader {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let file = File::open(path).map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = Self {
            path: path.to_path_buf(),
            headers: Vec::new(),
            lines: BufReader::new(file),
            line: 0,
            buf: String::new(),
            failed: false,
        };
        loop {
            let Some(text) = reader.next_line()? else {
                return Err(IngestError::MissingHeader {
                    path: path.to_path_buf(),
                });
            };
            let headers = split_cells(text);
            if !is_blank(&headers) {
                reader.headers = headers;
                break;
            }
        }
        debug!(
            path = %path.display(),
            line = reader.line,
            columns = reader.headers.len(),
            "read tsv header"
        );
        Ok(reader)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next physical line without its terminator.
    fn next_line(&mut self) -> Result<Option<&str>, IngestError> {
        self.buf.clear();
        let read = self
            .lines
            .read_line(&mut self.buf)
            .map_err(|source| IngestError::Read {
                path: self.path.clone(),
                line: self.line + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        let text = self.buf.strip_suffix('\n').unwrap_or(&self.buf);
        Ok(Some(text.strip_suffix('\r').unwrap_or(text)))
    }

    fn read_next(&mut self) -> Option<Result<RawRow, IngestError>> {
        let cells = match self.next_line() {
            Ok(Some(text)) => split_cells(text),
            Ok(None) => return None,
            Err(error) => return Some(Err(error)),
        };
        let line = self.line;
        Some(zip_cells(&self.headers, cells, line).map(|fields| RawRow { line, fields }))
    }
}

impl Iterator for TsvReader {
    type Item = Result<RawRow, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.read_next();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Reads the header and every data row of `path`.
pub fn read_tsv(path: &Path) -> Result<(Vec<String>, Vec<RawRow>), IngestError> {
    let reader = TsvReader::open(path)?;
    let headers = reader.headers().to_vec();
    let rows = reader.collect::<Result<Vec<_>, _>>()?;
    Ok((headers, rows))
}

/// Pairs `cells` with `headers` by position.
///
/// A line with no content is an [`IngestError::EmptyRow`]; any other cell
/// count that differs from the header is an [`IngestError::RowShape`].
pub fn zip_cells(
    headers: &[String],
    cells: Vec<String>,
    line: u64,
) -> Result<BTreeMap<String, String>, IngestError> {
    if is_blank(&cells) {
        return Err(IngestError::EmptyRow { line });
    }
    if cells.len() != headers.len() {
        return Err(IngestError::RowShape {
            line,
            expected: headers.len(),
            found: cells.len(),
        });
    }
    Ok(headers.iter().cloned().zip(cells).collect())
}

fn split_cells(text: &str) -> Vec<String> {
    text.split('\t').map(normalize_cell).collect()
}

fn is_blank(cells: &[String]) -> bool {
    cells.is_empty() || (cells.len() == 1 && cells[0].is_empty())
}

fn normalize_cell(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn zips_cells_by_position() {
        let fields = zip_cells(
            &headers(&["cccdid", "extension"]),
            vec!["uuid1".to_string(), "txt".to_string()],
            2,
        )
        .unwrap();
        assert_eq!(fields["cccdid"], "uuid1");
        assert_eq!(fields["extension"], "txt");
    }

    #[test]
    fn short_row_is_a_shape_error() {
        let err = zip_cells(
            &headers(&["a", "b", "c"]),
            vec!["1".to_string(), "2".to_string()],
            4,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::RowShape {
                line: 4,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn blank_line_is_an_empty_row() {
        let err = zip_cells(&headers(&["a", "b"]), vec![String::new()], 3).unwrap_err();
        assert!(matches!(err, IngestError::EmptyRow { line: 3 }));
    }

    #[test]
    fn split_keeps_empty_cells() {
        assert_eq!(split_cells("a\t\tc"), vec!["a", "", "c"]);
        assert!(is_blank(&split_cells(" ")));
    }

    #[test]
    fn cells_are_trimmed() {
        assert_eq!(normalize_cell("\u{feff} sample_id "), "sample_id");
    }
}
