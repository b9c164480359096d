#![allow(dead_code)]

use fixtures::{DocumentStore, FixtureConfig, FixtureError, FixtureHarness};
use model::metadata::{entity::EntityMetadata, registry::SchemaRegistry};
use tracing_subscriber::EnvFilter;

pub mod integration;
pub mod utils;

/// Entities shared by the end-to-end scenarios:
/// `User -> Company -> Country`, `User -> Manager (User)` and
/// `User -> Groups (many Group)`.
pub fn schema() -> Result<SchemaRegistry, FixtureError> {
    let registry = SchemaRegistry::new()
        .with(
            EntityMetadata::new("User")
                .scalar("name")
                .scalar("email")
                .reference_one("Company", "Company")
                .reference_one("Manager", "User")
                .reference_many("Groups", "Group"),
        )?
        .with(
            EntityMetadata::new("Company")
                .scalar("name")
                .reference_one("Country", "Country"),
        )?
        .with(EntityMetadata::new("Country").identified_by("code").scalar("name"))?
        .with(EntityMetadata::new("Group").scalar("title"))?;
    Ok(registry)
}

pub fn harness(config: FixtureConfig) -> FixtureHarness {
    FixtureHarness::new(config, || DocumentStore::new(schema()?)).expect("open fixture harness")
}

/// Installs a stderr subscriber honouring `RUST_LOG`. Safe to call from
/// several tests.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init();
}
