use thiserror::Error;

use shipyard_core::EntityKind;

/// Errors emitted by repository implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {kind} key '{key}'")]
    DuplicateKey { kind: EntityKind, key: String },
    #[error("{kind} key '{key}' not found")]
    MissingKey { kind: EntityKind, key: String },
    #[error("{kind} '{key}' references missing {referenced} '{value}' via '{field}'")]
    ForeignKey {
        kind: EntityKind,
        key: String,
        field: String,
        referenced: EntityKind,
        value: String,
    },
    #[error("invalid snapshot name '{name}': {reason}")]
    InvalidSnapshotName { name: String, reason: String },
    #[error("corrupt table '{table}': {message}")]
    Corrupt { table: String, message: String },
    #[error("core error: {0}")]
    Core(#[from] shipyard_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for repository operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
