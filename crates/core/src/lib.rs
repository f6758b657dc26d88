pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::{AppConfig, CachePolicy};
pub use error::{IntelError, IntelResult};
pub use source::{CsvDirectorySource, DataSource, InMemorySource};
pub use types::{BusinessRecord, MarketingRecord, Platform, RawTable, SourceTables};
