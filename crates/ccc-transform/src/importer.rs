//! Batch import of TSV files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use ccc_ingest::TsvReader;
use ccc_model::{Collection, NormalizedRecord, StorageKey, Value};

use crate::error::Result;
use crate::normalizer::RowNormalizer;

/// Whether imported records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    #[default]
    Write,
    /// Normalize and return records without writing them.
    DryRun,
}

/// One normalized row and where it belongs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedRecord {
    pub key: StorageKey,
    pub collection: Collection,
    pub record: NormalizedRecord,
    /// Store acknowledgement; `None` in dry runs.
    pub ack: Option<serde_json::Value>,
}

/// Normalizes rows in order and writes each before the next is read.
pub struct BatchImporter<'a> {
    normalizer: RowNormalizer<'a>,
    mode: ImportMode,
}

impl<'a> BatchImporter<'a> {
    pub fn new(normalizer: RowNormalizer<'a>, mode: ImportMode) -> Self {
        Self { normalizer, mode }
    }

    pub fn normalizer(&self) -> &RowNormalizer<'a> {
        &self.normalizer
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    /// Imports every data row of `path`.
    ///
    /// The first failing row aborts the batch; rows before it stay written.
    pub fn import_file(&self, path: &Path) -> Result<Vec<ImportedRecord>> {
        let domain = &self.normalizer.domain().name;
        let project = &self.normalizer.context().project_code;
        let span = info_span!("import", %domain, %project, path = %path.display());
        let _guard = span.enter();

        let reader = TsvReader::open(path)?;
        debug!(columns = ?reader.headers(), "read header");
        let mut imported = Vec::new();
        for row in reader {
            let row = row?;
            let line = row.line;
            let result = self
                .normalizer
                .normalize_strings(row.fields)
                .and_then(|record| self.store_record(record));
            match result {
                Ok(record) => {
                    debug!(line, key = %record.key, "imported row");
                    imported.push(record);
                }
                Err(error) => {
                    warn!(
                        line,
                        %error,
                        transport = error.is_transport(),
                        "row failed, aborting batch"
                    );
                    return Err(error);
                }
            }
        }
        info!(
            rows = imported.len(),
            dry_run = self.mode == ImportMode::DryRun,
            "import finished"
        );
        Ok(imported)
    }

    /// Normalizes and stores one already-keyed record.
    pub fn import_record(&self, raw: BTreeMap<String, Value>) -> Result<ImportedRecord> {
        let record = self.normalizer.normalize(raw)?;
        self.store_record(record)
    }

    fn store_record(&self, record: NormalizedRecord) -> Result<ImportedRecord> {
        let key = self.normalizer.storage_key(&record)?;
        let collection = self.normalizer.collection();
        let ack = match self.mode {
            ImportMode::DryRun => None,
            ImportMode::Write => Some(self.normalizer.store().put(&collection, &key, &record)?),
        };
        Ok(ImportedRecord {
            key,
            collection,
            record,
            ack,
        })
    }
}
