use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

use shipyard_core::{EntityKind, FieldValue};

/// One differing field between two entities of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub field: String,
    pub expected: FieldValue,
    pub actual: FieldValue,
}

/// Every differing field of one compared pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonFailure {
    pub kind: EntityKind,
    /// Identity value of the expected entity.
    pub identity: String,
    pub mismatches: Vec<Mismatch>,
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, mismatch) in self.mismatches.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}->{}:", self.identity, mismatch.field)?;
            writeln!(f, "\texpected: {}", mismatch.expected)?;
            write!(f, "\treceived: {}", mismatch.actual)?;
        }
        Ok(())
    }
}

impl StdError for ComparisonFailure {}

/// Verification outcome for one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindVerification {
    pub kind: EntityKind,
    pub expected_rows: u64,
    pub actual_rows: u64,
    pub compared: u64,
    pub matched: u64,
    pub failures: Vec<ComparisonFailure>,
    /// Identities present only on the expected side.
    pub missing: Vec<String>,
    /// Identities present only on the actual side.
    pub extra: Vec<String>,
}

impl KindVerification {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            expected_rows: 0,
            actual_rows: 0,
            compared: 0,
            matched: 0,
            failures: Vec::new(),
            missing: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.missing.is_empty() && self.extra.is_empty()
    }

    pub fn mismatched_identities(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.identity.as_str())
    }
}

/// Verification outcome across kinds, in dependency order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub expected_location: String,
    pub actual_location: String,
    pub kinds: Vec<KindVerification>,
    pub duration_ms: u64,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.kinds.iter().all(KindVerification::is_clean)
    }

    /// Number of failed pairs plus one-sided identities.
    pub fn problem_count(&self) -> u64 {
        self.kinds
            .iter()
            .map(|kind| (kind.failures.len() + kind.missing.len() + kind.extra.len()) as u64)
            .sum()
    }

    pub fn kind(&self, kind: EntityKind) -> Option<&KindVerification> {
        self.kinds.iter().find(|entry| entry.kind == kind)
    }
}
