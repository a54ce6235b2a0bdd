//! Fleet entity repositories.
//!
//! Provides the `Repository` contract consumed by the assembler and the
//! driver, plus an in-memory store and a CSV directory store with snapshots.

pub mod adapter;
pub mod csv_store;
pub mod errors;
pub mod memory;
pub mod tables;

pub use adapter::{Repository, ScopedSnapshot};
pub use csv_store::{CsvRepository, validate_snapshot_name};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryRepository;
pub use tables::TableSet;
