use std::fs;
use std::path::PathBuf;

use shipyard_core::{Engine, Entity, EntityKind, FieldValue, Hull, Ship, Weapon};
use shipyard_store::{CsvRepository, MemoryRepository, Repository, ScopedSnapshot, StoreError};

fn temp_store_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("shipyard_store_{label}_{}", uuid::Uuid::new_v4()));
    dir.push("store");
    dir
}

fn seed(repo: &mut impl Repository) {
    let hull = Entity::from(Hull {
        hull: "hull_1".to_string(),
        armor: 100,
        r#type: 2,
        capacity: 300,
    });
    let engine = Entity::from(Engine {
        engine: "engine_1".to_string(),
        power: 4200,
        r#type: 5,
    });
    let weapon = Entity::from(Weapon {
        weapon: "weapon_1".to_string(),
        reload_speed: 4,
        rotational_speed: 21,
        diameter: 12,
        power_volley: 160,
        count: 3,
    });
    let ship = Entity::from(Ship {
        ship: "ship_1".to_string(),
        weapon: "weapon_1".to_string(),
        hull: "hull_1".to_string(),
        engine: "engine_1".to_string(),
    });
    for entity in [hull, engine, weapon, ship] {
        repo.insert(&entity).expect("insert seed entity");
    }
}

#[test]
fn reopen_reads_persisted_rows() {
    let dir = temp_store_dir("reopen");
    {
        let mut repo = CsvRepository::open(&dir).expect("open store");
        seed(&mut repo);
    }

    let repo = CsvRepository::open(&dir).expect("reopen store");
    let ships = repo.select(EntityKind::Ship).expect("select ships");
    assert_eq!(ships.len(), 1);
    assert_eq!(ships[0].get("engine"), Some(FieldValue::from("engine_1")));

    let header = fs::read_to_string(dir.join("weapons.csv")).expect("read weapons.csv");
    assert!(header.starts_with("weapon,reload_speed,rotational_speed,diameter,power_volley,count"));

    fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn snapshot_is_isolated_from_source() {
    let dir = temp_store_dir("isolation");
    let mut source = CsvRepository::open(&dir).expect("open store");
    seed(&mut source);

    let mut snapshot = source.create_snapshot("backup").expect("snapshot");
    assert_eq!(snapshot.dir(), dir.parent().expect("parent").join("backup"));

    let hull = source.select(EntityKind::Hull).expect("select")[0].clone();
    let changed = hull
        .with_fields([("armor", FieldValue::Int(450))])
        .expect("change armor");
    snapshot.update(&changed).expect("update snapshot");

    let source_hull = &source.select(EntityKind::Hull).expect("select")[0];
    let snapshot_hull = &snapshot.select(EntityKind::Hull).expect("select")[0];
    assert_eq!(source_hull.get("armor"), Some(FieldValue::Int(100)));
    assert_eq!(snapshot_hull.get("armor"), Some(FieldValue::Int(450)));

    let reopened = CsvRepository::open(snapshot.dir()).expect("reopen snapshot");
    assert_eq!(
        reopened.select(EntityKind::Hull).expect("select")[0].get("armor"),
        Some(FieldValue::Int(450))
    );

    fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn scoped_snapshot_removes_its_directory() {
    let dir = temp_store_dir("scoped");
    let mut source = CsvRepository::open(&dir).expect("open store");
    seed(&mut source);

    let snapshot_dir = {
        let snapshot = ScopedSnapshot::create(&source, "scoped_backup").expect("snapshot");
        let path = snapshot.dir().to_path_buf();
        assert!(path.join("ships.csv").exists());
        path
    };

    assert!(!snapshot_dir.exists());
    assert!(dir.join("ships.csv").exists());

    fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn corrupt_header_is_reported() {
    let dir = temp_store_dir("corrupt");
    fs::create_dir_all(&dir).expect("create dir");
    fs::write(dir.join("hulls.csv"), "hull,armor\nhull_1,10\n").expect("write hulls.csv");

    let err = CsvRepository::open(&dir).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));

    fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn memory_snapshot_is_isolated_from_source() {
    let mut source = MemoryRepository::new("source");
    seed(&mut source);
    let mut snapshot = source.create_snapshot("backup").expect("snapshot");

    let engine = source.select(EntityKind::Engine).expect("select")[0]
        .with_fields([("power", FieldValue::Int(9900))])
        .expect("change power");
    source.update(&engine).expect("update source");

    assert_eq!(
        snapshot.select(EntityKind::Engine).expect("select")[0].get("power"),
        Some(FieldValue::Int(4200))
    );
    snapshot.destroy().expect("destroy");
    assert_eq!(snapshot.len(EntityKind::Engine), 0);
    assert_eq!(source.len(EntityKind::Engine), 1);
}

#[test]
fn snapshot_names_outside_the_parent_are_refused() {
    let dir = temp_store_dir("names");
    let root = dir.parent().expect("parent").to_path_buf();
    let mut source = CsvRepository::open(&dir).expect("open store");
    seed(&mut source);
    let sibling = root.join("unrelated");
    fs::create_dir_all(&sibling).expect("create sibling");
    fs::write(sibling.join("keep.txt"), "keep").expect("write sibling file");

    let absolute = root.join("elsewhere").display().to_string();
    for name in [".", "..", "", "  ", "a/b", "../escape", "store", absolute.as_str()] {
        let err = ScopedSnapshot::create(&source, name).err();
        assert!(
            matches!(err, Some(StoreError::InvalidSnapshotName { .. })),
            "snapshot name {name:?} accepted"
        );
        assert!(dir.join("hulls.csv").exists(), "source removed by {name:?}");
        assert!(sibling.join("keep.txt").exists(), "sibling removed by {name:?}");
    }
    assert!(!root.join("elsewhere").exists());

    assert!(shipyard_store::validate_snapshot_name("snapshot").is_ok());

    fs::remove_dir_all(root).ok();
}
