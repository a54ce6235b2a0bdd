use std::ffi::OsStr;
use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use shipyard_core::{Entity, EntityKind, FieldValue, dependency_order};

use crate::adapter::Repository;
use crate::errors::{StoreError, StoreResult};
use crate::tables::TableSet;

/// Repository persisted as one CSV file per table inside a directory.
///
/// Every write rewrites the affected table through a temp file and a rename,
/// so a table file is always either the old or the new version.
#[derive(Debug)]
pub struct CsvRepository {
    dir: PathBuf,
    tables: TableSet,
}

impl CsvRepository {
    /// Open a store directory, creating it and any missing table files.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        create_dir_all(&dir)?;

        let mut tables = TableSet::new();
        for kind in dependency_order()? {
            let path = table_path(&dir, kind);
            if path.exists() {
                for entity in read_table(&path, kind)? {
                    tables.insert(entity)?;
                }
            } else {
                write_table(&path, kind, &[])?;
            }
        }

        info!(location = %dir.display(), "csv store opened");
        Ok(Self { dir, tables })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn persist(&self, kind: EntityKind) -> StoreResult<()> {
        let rows = self.tables.select(kind);
        write_table(&table_path(&self.dir, kind), kind, &rows)?;
        debug!(table = kind.table_name(), rows = rows.len(), "table persisted");
        Ok(())
    }
}

impl Repository for CsvRepository {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn insert(&mut self, entity: &Entity) -> StoreResult<()> {
        self.tables.insert(entity.clone())?;
        self.persist(entity.kind())
    }

    fn select(&self, kind: EntityKind) -> StoreResult<Vec<Entity>> {
        Ok(self.tables.select(kind))
    }

    fn update(&mut self, entity: &Entity) -> StoreResult<()> {
        self.tables.update(entity.clone())?;
        self.persist(entity.kind())
    }

    /// Copy every table into a sibling directory called `name`.
    ///
    /// An existing directory with that name is replaced.
    fn create_snapshot(&self, name: &str) -> StoreResult<Self> {
        validate_snapshot_name(name)?;
        let target = match self.dir.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        };
        if target == self.dir || self.dir.file_name() == Some(OsStr::new(name)) {
            return Err(StoreError::InvalidSnapshotName {
                name: name.to_string(),
                reason: "names the source store".to_string(),
            });
        }
        if target.exists() {
            std::fs::remove_dir_all(&target)?;
        }
        create_dir_all(&target)?;

        let snapshot = Self {
            dir: target,
            tables: self.tables.clone(),
        };
        for kind in EntityKind::ALL {
            snapshot.persist(kind)?;
        }

        info!(
            source = %self.dir.display(),
            snapshot = %snapshot.dir.display(),
            "snapshot created"
        );
        Ok(snapshot)
    }

    fn destroy(&mut self) -> StoreResult<()> {
        self.tables = TableSet::new();
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
            info!(location = %self.dir.display(), "store removed");
        }
        Ok(())
    }
}

/// Check that `name` is a single plain directory name.
///
/// Snapshots are created next to the source store and replace an existing
/// directory of the same name, so `.`, `..`, separators and absolute paths
/// are refused.
pub fn validate_snapshot_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidSnapshotName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == OsStr::new(name) => Ok(()),
        _ => Err(invalid("must be a single directory name")),
    }
}

fn table_path(dir: &Path, kind: EntityKind) -> PathBuf {
    dir.join(format!("{}.csv", kind.table_name()))
}

fn read_table(path: &Path, kind: EntityKind) -> StoreResult<Vec<Entity>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let expected: Vec<&str> = kind.fields().iter().map(|spec| spec.name).collect();
    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found != expected {
        return Err(StoreError::Corrupt {
            table: kind.table_name().to_string(),
            message: format!("expected columns {expected:?}, found {found:?}"),
        });
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let mut values = Vec::with_capacity(kind.field_count());
        for (spec, raw) in kind.fields().iter().zip(record.iter()) {
            let value = FieldValue::parse(raw, spec.field_type).ok_or_else(|| {
                StoreError::Corrupt {
                    table: kind.table_name().to_string(),
                    message: format!("row {}: invalid {} value '{raw}'", line + 1, spec.name),
                }
            })?;
            values.push(value);
        }
        rows.push(Entity::from_values(kind, values)?);
    }
    Ok(rows)
}

fn write_table(path: &Path, kind: EntityKind, rows: &[Entity]) -> StoreResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    let header: Vec<&str> = kind.fields().iter().map(|spec| spec.name).collect();
    writer.write_record(&header)?;
    for row in rows {
        let record: Vec<String> = row.values().iter().map(FieldValue::to_string).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    let data = writer.into_inner().map_err(|err| err.into_error())?;

    write_bytes_atomic(path, &data)?;
    Ok(())
}

fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)
}
