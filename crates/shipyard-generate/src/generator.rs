use std::collections::BTreeMap;

use rand::RngCore;

use shipyard_core::{Entity, EntityKind, FieldValue};

use crate::errors::GenerationError;
use crate::registry::RuleRegistry;

/// Builds new entities from registry rules plus explicit overrides.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Generator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Generate a new entity of `kind`.
    ///
    /// Every rule for `kind` is invoked in registration order, later rules
    /// overwriting earlier ones for the same field. Overrides are applied
    /// last and always win. There must be strictly fewer overrides than the
    /// kind has fields; use [`Entity::from_values`] for fully explicit rows.
    pub fn generate<'a, I>(
        &self,
        kind: EntityKind,
        overrides: I,
        rng: &mut dyn RngCore,
    ) -> Result<Entity, GenerationError>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let overrides: BTreeMap<&str, FieldValue> = overrides.into_iter().collect();
        if overrides.len() >= kind.field_count() {
            return Err(GenerationError::TooManyOverrides {
                kind,
                given: overrides.len(),
                limit: kind.field_count(),
            });
        }

        let mut slots: Vec<Option<FieldValue>> = vec![None; kind.field_count()];

        for rule in self.registry.matching(kind) {
            let value = rule.produce(rng)?;
            if let Some(index) = kind.field_index(rule.field()) {
                slots[index] = Some(value);
            }
        }

        for (field, value) in overrides {
            let spec = kind.require_field(field)?;
            if value.field_type() != spec.field_type {
                return Err(shipyard_core::Error::TypeMismatch {
                    kind,
                    field: field.to_string(),
                    expected: spec.field_type,
                }
                .into());
            }
            if let Some(index) = kind.field_index(field) {
                slots[index] = Some(value);
            }
        }

        let missing: Vec<String> = kind
            .fields()
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(spec, _)| spec.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GenerationError::MissingFields {
                kind,
                fields: missing,
            });
        }

        let values = slots.into_iter().flatten().collect();
        Ok(Entity::from_values(kind, values)?)
    }
}
