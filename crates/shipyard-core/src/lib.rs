//! Core contracts for shipyard.
//!
//! This crate defines the fleet entity model, the static per-kind schema table,
//! and the foreign key dependency order shared by the generator, the stores
//! and the comparison oracle.

pub mod entity;
pub mod error;
pub mod graph;
pub mod schema;
pub mod types;

pub use entity::{Engine, Entity, Hull, Ship, Weapon};
pub use error::{Error, Result};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report, dependency_order};
pub use schema::{EntityKind, FieldSpec, ForeignKey};
pub use types::{FieldType, FieldValue};
