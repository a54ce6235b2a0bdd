use std::collections::BTreeSet;
use std::time::Instant;

use rand::RngCore;
use tracing::{debug, info};

use shipyard_core::{EntityKind, FieldValue, ForeignKey, dependency_order};
use shipyard_store::Repository;

use crate::errors::GenerationError;
use crate::generator::Generator;
use crate::model::{
    KindReport, MutateOptions, MutationKindReport, MutationReport, PopulateOptions,
    PopulationReport,
};
use crate::mutator::Mutator;
use crate::registry::RuleRegistry;
use crate::rules::{Producer, sample_pool};

/// Populates and mutates a repository while keeping Ship references valid.
///
/// Base kinds are produced before the ships that reference them. During ship
/// mutation the registry is temporarily extended with pool rules built from
/// the repository's current identities; those rules are removed again on
/// every exit path.
#[derive(Debug)]
pub struct Assembler<'a> {
    registry: &'a mut RuleRegistry,
    populate: PopulateOptions,
    mutate: MutateOptions,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a mut RuleRegistry) -> Self {
        Self {
            registry,
            populate: PopulateOptions::default(),
            mutate: MutateOptions::default(),
        }
    }

    pub fn with_populate_options(mut self, options: PopulateOptions) -> Self {
        self.populate = options;
        self
    }

    pub fn with_mutate_options(mut self, options: MutateOptions) -> Self {
        self.mutate = options;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        self.registry
    }

    /// Generate and insert every kind in dependency order.
    pub fn populate<R>(
        &mut self,
        repo: &mut R,
        rng: &mut dyn RngCore,
    ) -> Result<PopulationReport, GenerationError>
    where
        R: Repository + ?Sized,
    {
        let start = Instant::now();
        let mut report = PopulationReport::default();
        let generator = Generator::new(&*self.registry);
        let max_attempts = self.populate.max_attempts_entity.max(1);

        for kind in dependency_order()? {
            let requested = self.populate.count(kind);
            let pools = referent_pools(&*repo, kind, requested)?;
            let mut used: BTreeSet<String> = repo
                .select(kind)?
                .iter()
                .map(|entity| entity.identity().to_string())
                .collect();
            let mut kind_report = KindReport {
                kind,
                rows_requested: requested as u64,
                rows_generated: 0,
                retries: 0,
            };

            for _ in 0..requested {
                let mut attempts = 0;
                let entity = loop {
                    attempts += 1;
                    let mut overrides = Vec::with_capacity(pools.len());
                    for (fk, pool) in &pools {
                        if let Some(value) = sample_pool(pool, rng) {
                            overrides.push((fk.field, value.clone()));
                        }
                    }
                    let candidate = generator.generate(kind, overrides, rng)?;
                    if used.insert(candidate.identity().to_string()) {
                        break candidate;
                    }
                    if attempts >= max_attempts {
                        return Err(GenerationError::IdentityExhausted { kind, attempts });
                    }
                    kind_report.retries += 1;
                    debug!(
                        kind = %kind,
                        identity = candidate.identity(),
                        attempt = attempts,
                        "identity collision, retrying"
                    );
                };
                repo.insert(&entity)?;
                kind_report.rows_generated += 1;
            }

            info!(
                kind = %kind,
                rows = kind_report.rows_generated,
                retries = kind_report.retries,
                location = %repo.location(),
                "kind populated"
            );
            report.retries_total += kind_report.retries;
            report.kinds.push(kind_report);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Mutate a sample of every kind and write the results back.
    ///
    /// Identities are never regenerated. Ship references are redrawn only
    /// from identities that exist in `repo` when the ship pass starts.
    pub fn mutate<R>(
        &mut self,
        repo: &mut R,
        rng: &mut dyn RngCore,
    ) -> Result<MutationReport, GenerationError>
    where
        R: Repository + ?Sized,
    {
        let start = Instant::now();
        let mut report = MutationReport::default();

        for kind in dependency_order()? {
            let kind_report = if kind.foreign_keys().is_empty() {
                mutate_rows(&*self.registry, &self.mutate, repo, kind, rng)?
            } else {
                self.mutate_referencing(repo, kind, rng)?
            };
            info!(
                kind = %kind,
                sampled = kind_report.rows_sampled,
                updated = kind_report.rows_updated,
                location = %repo.location(),
                "kind mutated"
            );
            report.kinds.push(kind_report);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn mutate_referencing<R>(
        &mut self,
        repo: &mut R,
        kind: EntityKind,
        rng: &mut dyn RngCore,
    ) -> Result<MutationKindReport, GenerationError>
    where
        R: Repository + ?Sized,
    {
        let mut scope = self.registry.scope();
        for fk in kind.foreign_keys() {
            let pool: Vec<FieldValue> = repo
                .select(fk.referenced)?
                .iter()
                .map(|entity| FieldValue::from(entity.identity()))
                .collect();
            scope.add(kind, fk.field, Producer::pool(pool))?;
        }
        debug!(kind = %kind, rules = scope.pushed(), "reference pools registered");
        mutate_rows(&scope, &self.mutate, repo, kind, rng)
    }
}

fn referent_pools<R>(
    repo: &R,
    kind: EntityKind,
    requested: usize,
) -> Result<Vec<(&'static ForeignKey, Vec<FieldValue>)>, GenerationError>
where
    R: Repository + ?Sized,
{
    let mut pools = Vec::new();
    for fk in kind.foreign_keys() {
        let pool: Vec<FieldValue> = repo
            .select(fk.referenced)?
            .iter()
            .map(|entity| FieldValue::from(entity.identity()))
            .collect();
        if pool.is_empty() && requested > 0 {
            return Err(GenerationError::MissingReferents {
                kind,
                referenced: fk.referenced,
            });
        }
        pools.push((fk, pool));
    }
    Ok(pools)
}

fn mutate_rows<R>(
    registry: &RuleRegistry,
    options: &MutateOptions,
    repo: &mut R,
    kind: EntityKind,
    rng: &mut dyn RngCore,
) -> Result<MutationKindReport, GenerationError>
where
    R: Repository + ?Sized,
{
    let rows = repo.select(kind)?;
    let mut report = MutationKindReport::new(kind, rows.len());
    let mutator = Mutator::new(registry);
    let identity = kind.identity_field();
    let probability = options.probability(kind);

    for _ in 0..options.sample_size(kind, rows.len()) {
        let Some(entity) = sample_pool(&rows, rng) else {
            break;
        };
        report.rows_sampled += 1;
        let mutation = mutator.modify_with_probability(entity, probability, &[identity], rng)?;
        for field in &mutation.changed {
            report.record_regenerated(field);
        }
        for field in &mutation.skipped {
            report.record_skipped(field);
        }
        repo.update(&mutation.entity)?;
        report.rows_updated += 1;
    }

    Ok(report)
}
