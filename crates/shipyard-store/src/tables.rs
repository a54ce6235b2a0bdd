use std::collections::BTreeMap;

use shipyard_core::{Entity, EntityKind};

use crate::errors::{StoreError, StoreResult};

/// In-memory table state keyed by kind, then by identity value.
///
/// Rows are kept in ascending identity order so every read is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSet {
    tables: BTreeMap<EntityKind, BTreeMap<String, Entity>>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> StoreResult<()> {
        self.check_references(&entity)?;
        let kind = entity.kind();
        let rows = self.tables.entry(kind).or_default();
        if rows.contains_key(entity.identity()) {
            return Err(StoreError::DuplicateKey {
                kind,
                key: entity.identity().to_string(),
            });
        }
        rows.insert(entity.identity().to_string(), entity);
        Ok(())
    }

    pub fn update(&mut self, entity: Entity) -> StoreResult<()> {
        self.check_references(&entity)?;
        let kind = entity.kind();
        let row = self
            .tables
            .get_mut(&kind)
            .and_then(|rows| rows.get_mut(entity.identity()))
            .ok_or_else(|| StoreError::MissingKey {
                kind,
                key: entity.identity().to_string(),
            })?;
        *row = entity;
        Ok(())
    }

    /// All rows of a kind, ascending by identity field.
    pub fn select(&self, kind: EntityKind) -> Vec<Entity> {
        self.tables
            .get(&kind)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.tables
            .get(&kind)
            .is_some_and(|rows| rows.contains_key(key))
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map(BTreeMap::len).unwrap_or(0)
    }

    fn check_references(&self, entity: &Entity) -> StoreResult<()> {
        for (fk, value) in entity.references() {
            if !self.contains(fk.referenced, value) {
                return Err(StoreError::ForeignKey {
                    kind: entity.kind(),
                    key: entity.identity().to_string(),
                    field: fk.field.to_string(),
                    referenced: fk.referenced,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_core::{Hull, Ship};

    fn hull(key: &str) -> Entity {
        Entity::Hull(Hull {
            hull: key.to_string(),
            armor: 40,
            r#type: 1,
            capacity: 200,
        })
    }

    #[test]
    fn select_orders_by_identity() {
        let mut tables = TableSet::new();
        for key in ["hull_9", "hull_10", "hull_1"] {
            tables.insert(hull(key)).expect("insert");
        }
        let keys: Vec<String> = tables
            .select(EntityKind::Hull)
            .iter()
            .map(|e| e.identity().to_string())
            .collect();
        assert_eq!(keys, vec!["hull_1", "hull_10", "hull_9"]);
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut tables = TableSet::new();
        tables.insert(hull("hull_1")).expect("insert");
        let err = tables.insert(hull("hull_1")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(tables.len(EntityKind::Hull), 1);
    }

    #[test]
    fn dangling_ship_reference_is_rejected() {
        let mut tables = TableSet::new();
        tables.insert(hull("hull_1")).expect("insert");
        let ship = Entity::Ship(Ship {
            ship: "ship_1".to_string(),
            weapon: "weapon_1".to_string(),
            hull: "hull_1".to_string(),
            engine: "engine_1".to_string(),
        });
        let err = tables.insert(ship).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKey { referenced: EntityKind::Weapon, .. }
        ));
    }

    #[test]
    fn update_requires_existing_row() {
        let mut tables = TableSet::new();
        let err = tables.update(hull("hull_1")).unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
    }
}
