//! Rule-based entity generation for shipyard.
//!
//! A session owns a [`RuleRegistry`]; the [`Generator`] builds new entities
//! from it, the [`Mutator`] regenerates fields of existing ones, and the
//! [`Assembler`] drives both against a repository while keeping Ship
//! references resolvable.

pub mod assembler;
pub mod errors;
pub mod generator;
pub mod model;
pub mod mutator;
pub mod registry;
pub mod rules;

pub use assembler::Assembler;
pub use errors::GenerationError;
pub use generator::Generator;
pub use model::{
    KindReport, MutateOptions, MutationKindReport, MutationReport, PopulateOptions,
    PopulationReport,
};
pub use mutator::{Mutation, Mutator};
pub use registry::{RuleRegistry, RuleScope};
pub use rules::{Producer, ProducerFn, ProducerSpec, Rule, RuleSpec, default_rules, sample_pool};
