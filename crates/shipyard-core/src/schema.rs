use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::FieldType;

/// Static metadata for a single entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Identity fields are never regenerated by mutation passes.
    pub mutable: bool,
}

const fn key(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Text,
        mutable: false,
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Text,
        mutable: true,
    }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Integer,
        mutable: true,
    }
}

const HULL_FIELDS: &[FieldSpec] = &[key("hull"), int("armor"), int("type"), int("capacity")];

const ENGINE_FIELDS: &[FieldSpec] = &[key("engine"), int("power"), int("type")];

const WEAPON_FIELDS: &[FieldSpec] = &[
    key("weapon"),
    int("reload_speed"),
    int("rotational_speed"),
    int("diameter"),
    int("power_volley"),
    int("count"),
];

const SHIP_FIELDS: &[FieldSpec] = &[key("ship"), text("weapon"), text("hull"), text("engine")];

const SHIP_FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey {
        field: "weapon",
        referenced: EntityKind::Weapon,
    },
    ForeignKey {
        field: "hull",
        referenced: EntityKind::Hull,
    },
    ForeignKey {
        field: "engine",
        referenced: EntityKind::Engine,
    },
];

/// Foreign key from a field to the identity field of another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    pub referenced: EntityKind,
}

/// The four entity kinds of the fleet schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hull,
    Engine,
    Weapon,
    Ship,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Hull,
        EntityKind::Engine,
        EntityKind::Weapon,
        EntityKind::Ship,
    ];

    /// Declared fields in storage order.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Hull => HULL_FIELDS,
            EntityKind::Engine => ENGINE_FIELDS,
            EntityKind::Weapon => WEAPON_FIELDS,
            EntityKind::Ship => SHIP_FIELDS,
        }
    }

    pub fn field_count(self) -> usize {
        self.fields().len()
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|spec| spec.name == name)
    }

    /// Resolve a field name, failing when it is not declared on this kind.
    pub fn require_field(self, name: &str) -> Result<&'static FieldSpec, Error> {
        self.field(name).ok_or_else(|| Error::UnknownField {
            kind: self,
            field: name.to_string(),
        })
    }

    /// The field uniquely identifying an entity within its kind.
    pub fn identity_field(self) -> &'static str {
        self.fields()[0].name
    }

    pub fn foreign_keys(self) -> &'static [ForeignKey] {
        match self {
            EntityKind::Ship => SHIP_FOREIGN_KEYS,
            _ => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Hull => "hull",
            EntityKind::Engine => "engine",
            EntityKind::Weapon => "weapon",
            EntityKind::Ship => "ship",
        }
    }

    /// Name of the persisted table holding this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Hull => "hulls",
            EntityKind::Engine => "engines",
            EntityKind::Weapon => "weapons",
            EntityKind::Ship => "ships",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Hull => "Hull",
            EntityKind::Engine => "Engine",
            EntityKind::Weapon => "Weapon",
            EntityKind::Ship => "Ship",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::UnknownKind(value.to_string()))
    }
}
