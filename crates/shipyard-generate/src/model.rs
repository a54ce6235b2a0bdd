use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shipyard_core::EntityKind;

/// Row counts and limits for a population pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulateOptions {
    pub hulls: usize,
    pub engines: usize,
    pub weapons: usize,
    pub ships: usize,
    /// Maximum attempts to draw an unused identity for a single entity.
    pub max_attempts_entity: u32,
}

impl PopulateOptions {
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Hull => self.hulls,
            EntityKind::Engine => self.engines,
            EntityKind::Weapon => self.weapons,
            EntityKind::Ship => self.ships,
        }
    }
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            hulls: 5,
            engines: 6,
            weapons: 20,
            ships: 200,
            max_attempts_entity: 50,
        }
    }
}

/// Sampling and probabilities for a mutation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutateOptions {
    /// Per-field probability for hulls, engines and weapons.
    pub base_probability: f64,
    /// Per-field probability for ships.
    pub ship_probability: f64,
    /// One in `base_divisor` base rows is sampled for mutation.
    pub base_divisor: usize,
    /// One in `ship_divisor` ships is sampled for mutation.
    pub ship_divisor: usize,
}

impl MutateOptions {
    pub fn probability(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::Ship => self.ship_probability,
            _ => self.base_probability,
        }
    }

    /// Number of rows sampled (with replacement) out of `rows`.
    pub fn sample_size(&self, kind: EntityKind, rows: usize) -> usize {
        let divisor = match kind {
            EntityKind::Ship => self.ship_divisor,
            _ => self.base_divisor,
        };
        rows.checked_div(divisor).unwrap_or(0)
    }
}

impl Default for MutateOptions {
    fn default() -> Self {
        Self {
            base_probability: 0.5,
            ship_probability: 0.3,
            base_divisor: 3,
            ship_divisor: 10,
        }
    }
}

/// Summary of a populated kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindReport {
    pub kind: EntityKind,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub retries: u64,
}

/// Report for a population pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationReport {
    pub kinds: Vec<KindReport>,
    pub retries_total: u64,
    pub duration_ms: u64,
}

/// Summary of a mutated kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationKindReport {
    pub kind: EntityKind,
    pub rows_available: u64,
    pub rows_sampled: u64,
    pub rows_updated: u64,
    pub fields_regenerated: BTreeMap<String, u64>,
    pub fields_skipped: BTreeMap<String, u64>,
}

impl MutationKindReport {
    pub fn new(kind: EntityKind, rows_available: usize) -> Self {
        Self {
            kind,
            rows_available: rows_available as u64,
            rows_sampled: 0,
            rows_updated: 0,
            fields_regenerated: BTreeMap::new(),
            fields_skipped: BTreeMap::new(),
        }
    }

    pub fn record_regenerated(&mut self, field: &str) {
        *self
            .fields_regenerated
            .entry(field.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_skipped(&mut self, field: &str) {
        *self.fields_skipped.entry(field.to_string()).or_insert(0) += 1;
    }
}

/// Report for a mutation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationReport {
    pub kinds: Vec<MutationKindReport>,
    pub duration_ms: u64,
}

impl MutationReport {
    pub fn rows_updated(&self) -> u64 {
        self.kinds.iter().map(|kind| kind.rows_updated).sum()
    }
}
