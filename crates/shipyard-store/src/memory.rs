use shipyard_core::{Entity, EntityKind};

use crate::adapter::Repository;
use crate::errors::StoreResult;
use crate::tables::TableSet;

/// Repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    name: String,
    tables: TableSet,
}

impl MemoryRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: TableSet::new(),
        }
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.len(kind)
    }
}

impl Repository for MemoryRepository {
    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn insert(&mut self, entity: &Entity) -> StoreResult<()> {
        self.tables.insert(entity.clone())
    }

    fn select(&self, kind: EntityKind) -> StoreResult<Vec<Entity>> {
        Ok(self.tables.select(kind))
    }

    fn update(&mut self, entity: &Entity) -> StoreResult<()> {
        self.tables.update(entity.clone())
    }

    fn create_snapshot(&self, name: &str) -> StoreResult<Self> {
        Ok(Self {
            name: name.to_string(),
            tables: self.tables.clone(),
        })
    }

    fn destroy(&mut self) -> StoreResult<()> {
        self.tables = TableSet::new();
        Ok(())
    }
}
