use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use shipyard_core::{Entity, EntityKind, Hull};
use shipyard_eval::{EvalError, render_report, verify_all, verify_kind, write_report};
use shipyard_generate::{Assembler, MutateOptions, PopulateOptions, RuleRegistry};
use shipyard_store::{CsvRepository, MemoryRepository, Repository, ScopedSnapshot};

fn temp_store_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("shipyard_eval_{label}_{}", uuid::Uuid::new_v4()));
    dir.push("source");
    dir
}

fn fleet() -> PopulateOptions {
    PopulateOptions {
        hulls: 4,
        engines: 3,
        weapons: 6,
        ships: 40,
        max_attempts_entity: 50,
    }
}

fn populated(registry: &mut RuleRegistry, repo: &mut impl Repository, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Assembler::new(registry)
        .with_populate_options(fleet())
        .populate(repo, &mut rng)
        .expect("populate");
}

#[test]
fn repeated_reads_of_unchanged_store_match() {
    let mut registry = RuleRegistry::with_defaults();
    let dir = temp_store_dir("unchanged");
    let mut repo = CsvRepository::open(&dir).expect("open store");
    populated(&mut registry, &mut repo, 7);

    let reopened = CsvRepository::open(&dir).expect("reopen store");
    let report = verify_all(&repo, &reopened).expect("verify");

    assert!(report.is_clean());
    for kind in &report.kinds {
        assert_eq!(kind.compared, kind.expected_rows);
        assert_eq!(kind.matched, kind.compared);
    }
    assert_eq!(report.kind(EntityKind::Ship).map(|k| k.compared), Some(40));
    std::fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn mutated_snapshot_differs_only_in_mutated_entities() {
    let mut registry = RuleRegistry::with_defaults();
    let dir = temp_store_dir("mutated");
    let mut source = CsvRepository::open(&dir).expect("open store");
    populated(&mut registry, &mut source, 11);

    let snapshot_dir;
    {
        let mut snapshot = ScopedSnapshot::create(&source, "snapshot").expect("snapshot");
        snapshot_dir = snapshot.dir().to_path_buf();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mutation = Assembler::new(&mut registry)
            .with_mutate_options(MutateOptions::default())
            .mutate(&mut *snapshot, &mut rng)
            .expect("mutate snapshot");
        assert!(mutation.rows_updated() > 0);

        let report = verify_all(&source, &*snapshot).expect("verify");
        assert!(!report.is_clean());
        for kind in &report.kinds {
            assert!(kind.missing.is_empty());
            assert!(kind.extra.is_empty());
            let identity = kind.kind.identity_field();
            for failure in &kind.failures {
                assert!(failure.mismatches.iter().all(|m| m.field != identity));
            }
            let mutated = mutation
                .kinds
                .iter()
                .find(|entry| entry.kind == kind.kind)
                .expect("mutation entry");
            assert!(kind.failures.len() as u64 <= mutated.rows_updated);
        }

        let markdown = render_report(&report, 5);
        assert!(markdown.contains("## Mismatches"));
        let files = write_report(&report, &dir.with_file_name("reports"), 5).expect("write");
        assert!(files.json_path.exists());
        assert!(files.markdown_path.exists());
    }

    assert!(!snapshot_dir.exists());
    let untouched = CsvRepository::open(&dir).expect("reopen source");
    assert!(verify_all(&source, &untouched).expect("verify").is_clean());
    std::fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn one_sided_identities_are_recorded() {
    let mut expected = MemoryRepository::new("expected");
    let mut actual = MemoryRepository::new("actual");
    let hull = |id: &str, armor: i64| {
        Entity::from(Hull {
            hull: id.to_string(),
            armor,
            r#type: 1,
            capacity: 100,
        })
    };
    expected.insert(&hull("hull_1", 40)).expect("insert");
    expected.insert(&hull("hull_2", 40)).expect("insert");
    actual.insert(&hull("hull_1", 50)).expect("insert");
    actual.insert(&hull("hull_3", 40)).expect("insert");

    let result = verify_kind(&expected, &actual, EntityKind::Hull).expect("verify");

    assert_eq!(result.compared, 1);
    assert_eq!(result.mismatched_identities().collect::<Vec<_>>(), vec!["hull_1"]);
    assert_eq!(result.missing, vec!["hull_2".to_string()]);
    assert_eq!(result.extra, vec!["hull_3".to_string()]);
}

#[test]
fn kind_mismatch_is_not_a_field_mismatch() {
    let hull = Entity::from(Hull {
        hull: "x".to_string(),
        armor: 30,
        r#type: 1,
        capacity: 100,
    });
    let ship = Entity::from(shipyard_core::Ship {
        ship: "x".to_string(),
        weapon: "w".to_string(),
        hull: "h".to_string(),
        engine: "e".to_string(),
    });
    let err = shipyard_eval::compare(&hull, &ship).unwrap_err();
    assert!(matches!(err, EvalError::KindMismatch { .. }));
}
