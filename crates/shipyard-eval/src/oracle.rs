use shipyard_core::Entity;

use crate::errors::EvalError;
use crate::model::{ComparisonFailure, Mismatch};

/// Compare two entities field by field in declared order.
///
/// Every differing field is collected; a kind mismatch is reported
/// separately as [`EvalError::KindMismatch`].
pub fn compare(expected: &Entity, actual: &Entity) -> Result<(), EvalError> {
    match diff(expected, actual)? {
        Some(failure) => Err(EvalError::Comparison(failure)),
        None => Ok(()),
    }
}

/// Like [`compare`], returning the collected mismatches instead of failing.
pub fn diff(expected: &Entity, actual: &Entity) -> Result<Option<ComparisonFailure>, EvalError> {
    let kind = expected.kind();
    if actual.kind() != kind {
        return Err(EvalError::KindMismatch {
            expected: kind,
            actual: actual.kind(),
        });
    }

    let mismatches: Vec<Mismatch> = kind
        .fields()
        .iter()
        .zip(expected.values().into_iter().zip(actual.values()))
        .filter(|(_, (left, right))| left != right)
        .map(|(spec, (left, right))| Mismatch {
            field: spec.name.to_string(),
            expected: left,
            actual: right,
        })
        .collect();

    if mismatches.is_empty() {
        return Ok(None);
    }
    Ok(Some(ComparisonFailure {
        kind,
        identity: expected.identity().to_string(),
        mismatches,
    }))
}
