use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{EntityKind, ForeignKey};
use crate::types::{FieldType, FieldValue};

/// Hull record; `hull` is the identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hull {
    pub hull: String,
    pub armor: i64,
    pub r#type: i64,
    pub capacity: i64,
}

/// Engine record; `engine` is the identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub engine: String,
    pub power: i64,
    pub r#type: i64,
}

/// Weapon record; `weapon` is the identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub weapon: String,
    pub reload_speed: i64,
    pub rotational_speed: i64,
    pub diameter: i64,
    pub power_volley: i64,
    pub count: i64,
}

/// Ship record referencing one weapon, hull and engine by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub ship: String,
    pub weapon: String,
    pub hull: String,
    pub engine: String,
}

/// Immutable entity value of any kind.
///
/// Entities never reference each other directly; relationships are key values
/// resolved against a store. Replacing fields always yields a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Hull(Hull),
    Engine(Engine),
    Weapon(Weapon),
    Ship(Ship),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Hull(_) => EntityKind::Hull,
            Entity::Engine(_) => EntityKind::Engine,
            Entity::Weapon(_) => EntityKind::Weapon,
            Entity::Ship(_) => EntityKind::Ship,
        }
    }

    /// Value of the identity field.
    pub fn identity(&self) -> &str {
        match self {
            Entity::Hull(hull) => &hull.hull,
            Entity::Engine(engine) => &engine.engine,
            Entity::Weapon(weapon) => &weapon.weapon,
            Entity::Ship(ship) => &ship.ship,
        }
    }

    /// Field values in declared order.
    pub fn values(&self) -> Vec<FieldValue> {
        match self {
            Entity::Hull(hull) => vec![
                FieldValue::Text(hull.hull.clone()),
                FieldValue::Int(hull.armor),
                FieldValue::Int(hull.r#type),
                FieldValue::Int(hull.capacity),
            ],
            Entity::Engine(engine) => vec![
                FieldValue::Text(engine.engine.clone()),
                FieldValue::Int(engine.power),
                FieldValue::Int(engine.r#type),
            ],
            Entity::Weapon(weapon) => vec![
                FieldValue::Text(weapon.weapon.clone()),
                FieldValue::Int(weapon.reload_speed),
                FieldValue::Int(weapon.rotational_speed),
                FieldValue::Int(weapon.diameter),
                FieldValue::Int(weapon.power_volley),
                FieldValue::Int(weapon.count),
            ],
            Entity::Ship(ship) => vec![
                FieldValue::Text(ship.ship.clone()),
                FieldValue::Text(ship.weapon.clone()),
                FieldValue::Text(ship.hull.clone()),
                FieldValue::Text(ship.engine.clone()),
            ],
        }
    }

    /// Value of a declared field, or `None` when the kind has no such field.
    pub fn get(&self, field: &str) -> Option<FieldValue> {
        let index = self.kind().field_index(field)?;
        self.values().into_iter().nth(index)
    }

    /// Build an entity from one value per declared field, in declared order.
    pub fn from_values(kind: EntityKind, values: Vec<FieldValue>) -> Result<Entity> {
        if values.len() != kind.field_count() {
            return Err(Error::Arity {
                kind,
                expected: kind.field_count(),
                found: values.len(),
            });
        }

        let mut cells = values.into_iter();
        let entity = match kind {
            EntityKind::Hull => Entity::Hull(Hull {
                hull: next_text(&mut cells, kind, "hull")?,
                armor: next_int(&mut cells, kind, "armor")?,
                r#type: next_int(&mut cells, kind, "type")?,
                capacity: next_int(&mut cells, kind, "capacity")?,
            }),
            EntityKind::Engine => Entity::Engine(Engine {
                engine: next_text(&mut cells, kind, "engine")?,
                power: next_int(&mut cells, kind, "power")?,
                r#type: next_int(&mut cells, kind, "type")?,
            }),
            EntityKind::Weapon => Entity::Weapon(Weapon {
                weapon: next_text(&mut cells, kind, "weapon")?,
                reload_speed: next_int(&mut cells, kind, "reload_speed")?,
                rotational_speed: next_int(&mut cells, kind, "rotational_speed")?,
                diameter: next_int(&mut cells, kind, "diameter")?,
                power_volley: next_int(&mut cells, kind, "power_volley")?,
                count: next_int(&mut cells, kind, "count")?,
            }),
            EntityKind::Ship => Entity::Ship(Ship {
                ship: next_text(&mut cells, kind, "ship")?,
                weapon: next_text(&mut cells, kind, "weapon")?,
                hull: next_text(&mut cells, kind, "hull")?,
                engine: next_text(&mut cells, kind, "engine")?,
            }),
        };

        if entity.identity().is_empty() {
            return Err(Error::EmptyIdentity { kind });
        }
        Ok(entity)
    }

    /// Copy-with: a new entity with the named fields replaced.
    ///
    /// Later replacements for the same field win. The original is untouched.
    pub fn with_fields<'a, I>(&self, replacements: I) -> Result<Entity>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let kind = self.kind();
        let mut values = self.values();
        for (field, value) in replacements {
            let index = kind.field_index(field).ok_or_else(|| Error::UnknownField {
                kind,
                field: field.to_string(),
            })?;
            values[index] = value;
        }
        Entity::from_values(kind, values)
    }

    /// Outgoing foreign keys paired with the referenced identity value.
    pub fn references(&self) -> Vec<(ForeignKey, &str)> {
        match self {
            Entity::Ship(ship) => self
                .kind()
                .foreign_keys()
                .iter()
                .map(|fk| {
                    let value = match fk.field {
                        "weapon" => ship.weapon.as_str(),
                        "hull" => ship.hull.as_str(),
                        _ => ship.engine.as_str(),
                    };
                    (*fk, value)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Hull> for Entity {
    fn from(value: Hull) -> Self {
        Entity::Hull(value)
    }
}

impl From<Engine> for Entity {
    fn from(value: Engine) -> Self {
        Entity::Engine(value)
    }
}

impl From<Weapon> for Entity {
    fn from(value: Weapon) -> Self {
        Entity::Weapon(value)
    }
}

impl From<Ship> for Entity {
    fn from(value: Ship) -> Self {
        Entity::Ship(value)
    }
}

fn next_text(
    cells: &mut impl Iterator<Item = FieldValue>,
    kind: EntityKind,
    field: &str,
) -> Result<String> {
    match cells.next() {
        Some(FieldValue::Text(value)) => Ok(value),
        _ => Err(type_mismatch(kind, field, FieldType::Text)),
    }
}

fn next_int(
    cells: &mut impl Iterator<Item = FieldValue>,
    kind: EntityKind,
    field: &str,
) -> Result<i64> {
    match cells.next() {
        Some(FieldValue::Int(value)) => Ok(value),
        _ => Err(type_mismatch(kind, field, FieldType::Integer)),
    }
}

fn type_mismatch(kind: EntityKind, field: &str, expected: FieldType) -> Error {
    Error::TypeMismatch {
        kind,
        field: field.to_string(),
        expected,
    }
}
