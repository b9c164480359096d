//! In-memory document store and the fixture/assertion helpers built on it.
//!
//! Tests obtain a [`FixtureHarness`] from a store factory, seed documents
//! with `have_in_repository`, and assert with `see_in_repository` /
//! `dont_see_in_repository` using the same nested filter mappings the
//! association builder understands.

pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod hydrate;
pub mod store;

pub use config::FixtureConfig;
pub use error::FixtureError;
pub use harness::FixtureHarness;
pub use hydrate::{Entity, FieldReader, Hydrate, Persist};
pub use store::DocumentStore;
