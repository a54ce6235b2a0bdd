use std::collections::BTreeSet;

use rand::RngCore;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

use shipyard_core::{Entity, FieldValue};

use crate::errors::GenerationError;
use crate::registry::RuleRegistry;

/// Result of a probabilistic mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Mutation {
    /// New entity; the input entity is never modified.
    pub entity: Entity,
    /// Fields that received a freshly produced value.
    pub changed: Vec<&'static str>,
    /// Selected fields left unchanged because no rule targets them.
    pub skipped: Vec<&'static str>,
}

impl Mutation {
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Regenerates selected fields of existing entities from registry rules.
#[derive(Debug, Clone, Copy)]
pub struct Mutator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Mutator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Regenerate a random subset of fields.
    ///
    /// The subset size is `ceil(fields * probability) - constant_fields.len()`,
    /// capped by the number of non-constant fields. Fields named in
    /// `constant_fields` are never selected. A selected field without a
    /// matching rule keeps its value and is listed in [`Mutation::skipped`].
    pub fn modify_with_probability(
        &self,
        entity: &Entity,
        probability: f64,
        constant_fields: &[&str],
        rng: &mut dyn RngCore,
    ) -> Result<Mutation, GenerationError> {
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(GenerationError::InvalidProbability(probability));
        }

        let kind = entity.kind();
        let mut constants = BTreeSet::new();
        for field in constant_fields {
            constants.insert(kind.require_field(field)?.name);
        }

        let candidates: Vec<&'static str> = kind
            .fields()
            .iter()
            .map(|spec| spec.name)
            .filter(|name| !constants.contains(name))
            .collect();

        let wanted = (kind.field_count() as f64 * probability).ceil() as usize;
        let target = wanted.saturating_sub(constants.len()).min(candidates.len());
        let selected: BTreeSet<&'static str> = candidates
            .choose_multiple(rng, target)
            .copied()
            .collect();

        let mut changed = Vec::new();
        let mut skipped = Vec::new();
        let mut replacements: Vec<(&str, FieldValue)> = Vec::new();

        for &field in candidates.iter().filter(|name| selected.contains(*name)) {
            let mut produced = None;
            for rule in self.registry.matching_field(kind, field) {
                produced = Some(rule.produce(rng)?);
            }
            match produced {
                Some(value) => {
                    replacements.push((field, value));
                    changed.push(field);
                }
                None => skipped.push(field),
            }
        }

        if !skipped.is_empty() {
            debug!(
                kind = %kind,
                identity = entity.identity(),
                skipped = ?skipped,
                "selected fields without rules left unchanged"
            );
        }

        Ok(Mutation {
            entity: entity.with_fields(replacements)?,
            changed,
            skipped,
        })
    }

    /// Regenerate one field with the first rule registered for it.
    ///
    /// A missing rule is an error, never a default value.
    pub fn modify_field(
        &self,
        entity: &Entity,
        field: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Entity, GenerationError> {
        let kind = entity.kind();
        let spec = kind.require_field(field)?;
        let rule = self
            .registry
            .first_for(kind, spec.name)
            .ok_or_else(|| GenerationError::NoRule {
                kind,
                field: spec.name.to_string(),
            })?;
        let value = rule.produce(rng)?;
        Ok(entity.with_fields([(spec.name, value)])?)
    }
}
