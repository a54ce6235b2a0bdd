use thiserror::Error;

use shipyard_core::EntityKind;
use shipyard_store::StoreError;

use crate::model::ComparisonFailure;

/// Errors emitted by the comparison oracle and verification engine.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("cannot compare {expected} with {actual}")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },
    #[error("{0}")]
    Comparison(ComparisonFailure),
    #[error("verification failed with {0} mismatching entities")]
    Failed(u64),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("core error: {0}")]
    Core(#[from] shipyard_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
