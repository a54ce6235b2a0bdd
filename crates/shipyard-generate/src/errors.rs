use thiserror::Error;

use shipyard_core::EntityKind;
use shipyard_store::StoreError;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("core error: {0}")]
    Core(#[from] shipyard_core::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid rule for {kind}.{field}: {message}")]
    InvalidRule {
        kind: EntityKind,
        field: String,
        message: String,
    },
    #[error("{kind} accepts fewer than {limit} overrides, got {given}")]
    TooManyOverrides {
        kind: EntityKind,
        given: usize,
        limit: usize,
    },
    #[error("no rule or override covers {kind} fields {fields:?}")]
    MissingFields { kind: EntityKind, fields: Vec<String> },
    #[error("no rule for {kind}.{field}")]
    NoRule { kind: EntityKind, field: String },
    #[error("probability must be in (0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("candidate pool for {kind}.{field} is empty")]
    EmptyPool { kind: EntityKind, field: String },
    #[error("cannot generate {kind}: no {referenced} rows to reference")]
    MissingReferents {
        kind: EntityKind,
        referenced: EntityKind,
    },
    #[error("no unique {kind} identity after {attempts} attempts")]
    IdentityExhausted { kind: EntityKind, attempts: u32 },
}
