//! Stalker TTRPG domain types.
//!
//! Pure value types for the reference-data loader: validated identifiers,
//! table descriptors and header matching, insert batches, seed layout and
//! run reports. No I/O lives here.

pub mod batch;
pub mod error;
pub mod identifier;
pub mod seed;
pub mod table;

pub use batch::{ImportBatch, RowValues, DEFAULT_BATCH_SIZE};
pub use error::DomainError;
pub use identifier::{Identifier, MAX_IDENTIFIER_LEN};
pub use seed::{
    FailedImport, ImportSummary, MissingSource, MultiFileCategory, SeedLayout, SeedReport,
    SeedSource, CSV_EXTENSION,
};
pub use table::{ColumnMapping, MappedColumn, TableDescriptor};
