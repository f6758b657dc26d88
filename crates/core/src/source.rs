//! Data-source collaborators that hand the analytics core its four raw tables.

use crate::config::DataConfig;
use crate::error::{IntelError, IntelResult};
use crate::types::{RawTable, SourceTables};
use std::path::PathBuf;
use tracing::{debug, info};

/// Anything that can produce the four source tables for one analysis run.
pub trait DataSource: Send + Sync {
    fn load(&self) -> IntelResult<SourceTables>;
}

/// Serves a fixed set of tables. Used by tests and embedders that parse
/// their own input.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: SourceTables,
}

impl InMemorySource {
    pub fn new(tables: SourceTables) -> Self {
        Self { tables }
    }
}

impl DataSource for InMemorySource {
    fn load(&self) -> IntelResult<SourceTables> {
        Ok(self.tables.clone())
    }
}

/// Reads `Facebook.csv`, `Google.csv`, `TikTok.csv` and the business log
/// from a single directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    config: DataConfig,
}

impl CsvDirectorySource {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    fn path_for(&self, file: &str) -> PathBuf {
        self.config.dir.join(file)
    }

    fn read_file(&self, name: &str, file: &str) -> IntelResult<RawTable> {
        let path = self.path_for(file);
        let handle = std::fs::File::open(&path).map_err(|e| {
            IntelError::data_load(name, format!("cannot open {}: {e}", path.display()))
        })?;
        let table = read_table(name, handle)?;
        debug!(source = name, path = %path.display(), rows = table.len(), "Read CSV source");
        Ok(table)
    }
}

impl DataSource for CsvDirectorySource {
    fn load(&self) -> IntelResult<SourceTables> {
        let tables = SourceTables {
            facebook: self.read_file("Facebook", &self.config.facebook_file)?,
            google: self.read_file("Google", &self.config.google_file)?,
            tiktok: self.read_file("TikTok", &self.config.tiktok_file)?,
            business: self.read_file("Business", &self.config.business_file)?,
        };
        info!(
            dir = %self.config.dir.display(),
            facebook = tables.facebook.len(),
            google = tables.google.len(),
            tiktok = tables.tiktok.len(),
            business = tables.business.len(),
            "Loaded source tables"
        );
        Ok(tables)
    }
}

/// Parse CSV text into a [`RawTable`]. Ragged rows are kept as-is and
/// rejected later during normalization.
pub fn read_table<R: std::io::Read>(name: &str, reader: R) -> IntelResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| IntelError::data_load(name, format!("unreadable header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(name, headers);
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| IntelError::data_load(name, format!("row {}: {e}", idx + 1)))?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}
