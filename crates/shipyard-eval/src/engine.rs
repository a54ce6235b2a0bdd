use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use shipyard_core::{Entity, EntityKind, dependency_order};
use shipyard_store::Repository;

use crate::errors::EvalError;
use crate::model::{KindVerification, VerificationReport};
use crate::oracle::diff;
use crate::report::render_report;

/// Compare one kind across two repositories, pairing entities by identity.
///
/// Comparison continues after failures; identities found on one side only
/// are recorded as missing or extra.
pub fn verify_kind<E, A>(
    expected: &E,
    actual: &A,
    kind: EntityKind,
) -> Result<KindVerification, EvalError>
where
    E: Repository + ?Sized,
    A: Repository + ?Sized,
{
    let expected_rows = expected.select(kind)?;
    let actual_rows = actual.select(kind)?;
    let mut result = KindVerification::new(kind);
    result.expected_rows = expected_rows.len() as u64;
    result.actual_rows = actual_rows.len() as u64;

    let mut remaining: BTreeMap<String, Entity> = actual_rows
        .into_iter()
        .map(|entity| (entity.identity().to_string(), entity))
        .collect();

    for entity in &expected_rows {
        let Some(other) = remaining.remove(entity.identity()) else {
            result.missing.push(entity.identity().to_string());
            continue;
        };
        result.compared += 1;
        match diff(entity, &other)? {
            Some(failure) => result.failures.push(failure),
            None => result.matched += 1,
        }
    }
    result.extra = remaining.into_keys().collect();

    if !result.is_clean() {
        warn!(
            kind = %kind,
            failures = result.failures.len(),
            missing = result.missing.len(),
            extra = result.extra.len(),
            "kind differs"
        );
    }
    Ok(result)
}

/// Verify every kind in dependency order.
pub fn verify_all<E, A>(expected: &E, actual: &A) -> Result<VerificationReport, EvalError>
where
    E: Repository + ?Sized,
    A: Repository + ?Sized,
{
    let start = Instant::now();
    let mut report = VerificationReport {
        expected_location: expected.location(),
        actual_location: actual.location(),
        ..VerificationReport::default()
    };

    for kind in dependency_order()? {
        report.kinds.push(verify_kind(expected, actual, kind)?);
    }
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        expected = %report.expected_location,
        actual = %report.actual_location,
        problems = report.problem_count(),
        duration_ms = report.duration_ms,
        "verification finished"
    );
    Ok(report)
}

/// Paths written by [`write_report`].
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Write `verification.json` and `report.md` into `dir`.
pub fn write_report(
    report: &VerificationReport,
    dir: &Path,
    max_examples: usize,
) -> Result<ReportFiles, EvalError> {
    std::fs::create_dir_all(dir)?;
    let json_path = dir.join("verification.json");
    std::fs::write(&json_path, serde_json::to_vec_pretty(report)?)?;
    let markdown_path = dir.join("report.md");
    std::fs::write(&markdown_path, render_report(report, max_examples))?;
    Ok(ReportFiles {
        json_path,
        markdown_path,
    })
}
