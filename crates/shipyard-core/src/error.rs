use thiserror::Error;

use crate::schema::EntityKind;
use crate::types::FieldType;

/// Core error type shared across shipyard crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The field is not declared on the entity kind.
    #[error("unknown field '{field}' on {kind}")]
    UnknownField { kind: EntityKind, field: String },
    /// A value does not match the declared semantic type of its field.
    #[error("type mismatch for {kind}.{field}: expected {expected}")]
    TypeMismatch {
        kind: EntityKind,
        field: String,
        expected: FieldType,
    },
    /// A row does not carry exactly one value per declared field.
    #[error("{kind} expects {expected} values, got {found}")]
    Arity {
        kind: EntityKind,
        expected: usize,
        found: usize,
    },
    /// The identity field of an entity is empty.
    #[error("{kind} identity field must not be empty")]
    EmptyIdentity { kind: EntityKind },
    /// The entity kind name is not recognized.
    #[error("unknown entity kind '{0}'")]
    UnknownKind(String),
    /// The foreign key graph between kinds contains a cycle.
    #[error("cyclic foreign key graph: {0:?}")]
    Cycle(Vec<EntityKind>),
}

/// Convenience alias for results returned by shipyard crates.
pub type Result<T> = std::result::Result<T, Error>;
