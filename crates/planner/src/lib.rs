//! Translates nested association filters into joins and predicates.
//!
//! A caller describes what it is looking for as a [`QuerySpec`]: a mapping
//! from field names to scalar values, `null`, or nested mappings that
//! traverse an association. [`AssociationQueryBuilder`] checks the mapping
//! against entity metadata and emits the resulting joins, predicates and
//! parameter bindings into a [`QueryAccumulator`](query_builder::accumulator::QueryAccumulator).

pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod macros;
pub mod spec;

pub use builder::{AssociationQueryBuilder, Emission, build};
pub use config::BuilderConfig;
pub use error::PlanError;
pub use filter::FilterNode;
pub use spec::{QuerySpec, SpecValue};
