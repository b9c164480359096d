//! Per-test fixture helpers: seed documents, then assert on what the
//! store holds using nested association filters.

use crate::{
    config::FixtureConfig,
    error::FixtureError,
    hydrate::{Hydrate, Persist},
    store::DocumentStore,
};
use model::{
    core::value::Value,
    metadata::provider::MetadataProvider,
    records::row::RowData,
};
use planner::{AssociationQueryBuilder, QuerySpec};
use query_builder::accumulator::QueryAccumulator;
use tracing::{debug, info, warn};

pub struct FixtureHarness {
    store: DocumentStore,
    config: FixtureConfig,
}

impl FixtureHarness {
    /// Opens a harness over the store produced by `factory`.
    pub fn new<F>(config: FixtureConfig, factory: F) -> Result<Self, FixtureError>
    where
        F: FnOnce() -> Result<DocumentStore, FixtureError>,
    {
        config.builder.validate()?;
        let store = factory()?;
        info!(
            "Fixture harness ready (cleanup: {}, root alias: {})",
            config.cleanup, config.builder.root_alias
        );
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Runs `test` inside a store transaction. The transaction is rolled
    /// back afterwards when `cleanup` is set and committed otherwise; a
    /// panicking test is always rolled back.
    pub fn isolated<T, F>(&self, test: F) -> Result<T, FixtureError>
    where
        F: FnOnce(&Self) -> T,
    {
        self.store.begin_transaction()?;
        let guard = TransactionGuard {
            store: &self.store,
            open: true,
        };
        let out = test(self);
        guard.close(self.config.cleanup)?;
        Ok(out)
    }

    /// Inserts a document built from `fields` and returns its identifier.
    pub fn have_in_repository<K, V, I>(&self, entity: &str, fields: I) -> Result<Value, FixtureError>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.store.insert(RowData::from_pairs(entity, fields))
    }

    /// Inserts `entity`, or replaces the stored document with the same
    /// identifier.
    pub fn persist_entity<T: Persist>(&self, entity: &T) -> Result<Value, FixtureError> {
        let row = entity.to_row();
        let meta = self
            .store
            .schema()
            .entity(T::NAME)
            .ok_or_else(|| FixtureError::UnknownCollection(T::NAME.to_string()))?;
        let id = row.get_value(&meta.identifier);
        if !id.is_null() && self.store.find_by_id(T::NAME, &id)?.is_some() {
            self.store.update(row)?;
            return Ok(id);
        }
        self.store.insert(row)
    }

    /// Documents of `entity` matching `spec`.
    pub fn find(&self, entity: &str, spec: &QuerySpec) -> Result<Vec<RowData>, FixtureError> {
        let builder =
            AssociationQueryBuilder::with_config(self.store.schema(), self.config.builder.clone())?;
        let accumulator = builder.query(entity, spec)?;
        debug!("{}", accumulator.to_query_string());
        self.store.execute(accumulator.query())
    }

    pub fn count_in_repository(&self, entity: &str, spec: &QuerySpec) -> Result<usize, FixtureError> {
        self.find(entity, spec).map(|rows| rows.len())
    }

    /// Asserts that at least one `entity` document matches `spec`.
    ///
    /// # Errors
    ///
    /// Returns the [`FixtureError`] when the filter cannot be planned or
    /// executed (unknown entity, malformed spec, ...).
    ///
    /// # Panics
    ///
    /// Panics, at the caller's location, when the query runs but matches
    /// nothing.
    #[track_caller]
    pub fn see_in_repository(&self, entity: &str, spec: &QuerySpec) -> Result<(), FixtureError> {
        let count = self.count_in_repository(entity, spec)?;
        if count == 0 {
            panic!("expected a `{entity}` document matching {spec:?}, found none");
        }
        Ok(())
    }

    /// Asserts that no `entity` document matches `spec`.
    ///
    /// # Errors
    ///
    /// Same as [`see_in_repository`](Self::see_in_repository): a filter that
    /// cannot be planned or executed is returned, not asserted on.
    ///
    /// # Panics
    ///
    /// Panics, at the caller's location, when the query matches anything.
    #[track_caller]
    pub fn dont_see_in_repository(&self, entity: &str, spec: &QuerySpec) -> Result<(), FixtureError> {
        let count = self.count_in_repository(entity, spec)?;
        if count > 0 {
            panic!("expected no `{entity}` document matching {spec:?}, found {count}");
        }
        Ok(())
    }

    /// Value of `field` on the first document matching `spec`.
    pub fn grab_from_repository(
        &self,
        entity: &str,
        field: &str,
        spec: &QuerySpec,
    ) -> Result<Value, FixtureError> {
        self.first(entity, spec).map(|row| row.get_value(field))
    }

    pub fn grab_entities_from_repository(
        &self,
        entity: &str,
        spec: &QuerySpec,
    ) -> Result<Vec<RowData>, FixtureError> {
        self.find(entity, spec)
    }

    /// First `T` matching `spec`, hydrated.
    pub fn grab_entity_from_repository<T: Hydrate>(&self, spec: &QuerySpec) -> Result<T, FixtureError> {
        T::from_row(&self.first(T::NAME, spec)?)
    }

    fn first(&self, entity: &str, spec: &QuerySpec) -> Result<RowData, FixtureError> {
        self.find(entity, spec)?
            .into_iter()
            .next()
            .ok_or_else(|| FixtureError::NotFound(entity.to_string()))
    }
}

/// Ends the transaction opened by [`FixtureHarness::isolated`], also when
/// the test body unwinds.
struct TransactionGuard<'s> {
    store: &'s DocumentStore,
    open: bool,
}

impl TransactionGuard<'_> {
    fn close(mut self, cleanup: bool) -> Result<(), FixtureError> {
        self.open = false;
        if cleanup {
            self.store.rollback()
        } else {
            self.store.commit()
        }
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            warn!("Isolated test panicked, discarding its writes");
            if let Err(e) = self.store.rollback() {
                warn!("Rollback after panic failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrate::{Entity, FieldReader};
    use model::metadata::{entity::EntityMetadata, registry::SchemaRegistry};
    use planner::{PlanError, query_spec};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use tracing_test::traced_test;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                EntityMetadata::new("User")
                    .scalar("name")
                    .reference_one("Company", "Company"),
            )
            .and_then(|s| s.with(EntityMetadata::new("Company").scalar("name")))
            .unwrap()
    }

    fn harness(config: FixtureConfig) -> FixtureHarness {
        FixtureHarness::new(config, || DocumentStore::new(schema())).unwrap()
    }

    #[derive(Debug, PartialEq)]
    struct Company {
        id: String,
        name: String,
    }

    impl Entity for Company {
        const NAME: &'static str = "Company";
    }

    impl Hydrate for Company {
        fn from_row(row: &RowData) -> Result<Self, FixtureError> {
            let r = FieldReader::new(row);
            Ok(Company {
                id: r.string("id")?,
                name: r.string("name")?,
            })
        }
    }

    impl Persist for Company {
        fn to_row(&self) -> RowData {
            RowData::from_pairs(
                Self::NAME,
                [("id", self.id.as_str()), ("name", self.name.as_str())],
            )
        }
    }

    #[test]
    fn factory_errors_propagate() {
        let result = FixtureHarness::new(FixtureConfig::default(), || {
            Err(FixtureError::Factory("connection refused".into()))
        });
        assert!(matches!(result, Err(FixtureError::Factory(_))));
    }

    #[test]
    #[traced_test]
    fn seen_and_unseen_documents() {
        let h = harness(FixtureConfig::default());
        let company = h
            .have_in_repository("Company", [("name", "Codegyre")])
            .unwrap();
        h.have_in_repository(
            "User",
            [("name", Value::from("hlogeon")), ("Company", company)],
        )
        .unwrap();

        h.see_in_repository("User", &query_spec! { "name" => "hlogeon" })
            .unwrap();
        h.see_in_repository(
            "User",
            &query_spec! { "name" => "hlogeon", "Company" => { "name" => "Codegyre" } },
        )
        .unwrap();
        h.dont_see_in_repository("User", &query_spec! { "Company" => { "name" => "Other" } })
            .unwrap();
        assert!(logs_contain(
            "SELECT s FROM User AS s INNER JOIN s.Company AS Company"
        ));
    }

    #[test]
    #[should_panic(expected = "expected a `User` document matching")]
    fn see_panics_without_match() {
        let h = harness(FixtureConfig::default());
        let _ = h.see_in_repository("User", &query_spec! { "name" => "nobody" });
    }

    #[test]
    fn assertion_helpers_return_query_errors_instead_of_panicking() {
        let h = harness(FixtureConfig::default());
        let bad = query_spec! { "name" => { "first" => "A" } };

        assert!(matches!(
            h.see_in_repository("User", &bad),
            Err(FixtureError::Plan(PlanError::InvalidSpecShape(_)))
        ));
        assert!(matches!(
            h.dont_see_in_repository("Ghost", &QuerySpec::new()),
            Err(FixtureError::Plan(PlanError::UnknownEntity(_)))
        ));
    }

    #[test]
    #[should_panic(expected = "expected no `User` document matching")]
    fn dont_see_panics_on_match() {
        let h = harness(FixtureConfig::default());
        h.have_in_repository("User", [("name", "A")]).unwrap();
        let _ = h.dont_see_in_repository("User", &query_spec! { "name" => "A" });
    }

    #[test]
    fn grab_helpers() {
        let h = harness(FixtureConfig::default());
        let id = h.have_in_repository("User", [("name", "A")]).unwrap();

        assert_eq!(
            h.grab_from_repository("User", "id", &query_spec! { "name" => "A" })
                .unwrap(),
            id
        );
        assert!(matches!(
            h.grab_from_repository("User", "id", &query_spec! { "name" => "B" }),
            Err(FixtureError::NotFound(entity)) if entity == "User"
        ));
        assert_eq!(
            h.grab_entities_from_repository("User", &QuerySpec::new())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn persisted_entities_are_upserted_and_hydrated() {
        let h = harness(FixtureConfig::default());
        let mut company = Company {
            id: "c1".into(),
            name: "Codegyre".into(),
        };
        h.persist_entity(&company).unwrap();
        company.name = "Codegyre Ltd".into();
        h.persist_entity(&company).unwrap();

        assert_eq!(h.count_in_repository("Company", &QuerySpec::new()).unwrap(), 1);
        let grabbed: Company = h
            .grab_entity_from_repository(&query_spec! { "name" => "Codegyre Ltd" })
            .unwrap();
        assert_eq!(grabbed, company);
    }

    #[test]
    fn isolated_writes_are_rolled_back() {
        let h = harness(FixtureConfig::default());
        h.have_in_repository("User", [("name", "kept")]).unwrap();

        let seen = h
            .isolated(|h| {
                h.have_in_repository("User", [("name", "temp")]).unwrap();
                h.count_in_repository("User", &QuerySpec::new()).unwrap()
            })
            .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(h.store().count("User").unwrap(), 1);
        assert!(!h.store().in_transaction());
    }

    #[test]
    fn isolated_writes_persist_without_cleanup() {
        let h = harness(FixtureConfig {
            cleanup: false,
            ..FixtureConfig::default()
        });
        h.isolated(|h| h.have_in_repository("User", [("name", "temp")]).unwrap())
            .unwrap();
        assert_eq!(h.store().count("User").unwrap(), 1);
    }

    #[test]
    #[traced_test]
    fn panicking_test_body_is_rolled_back() {
        let h = harness(FixtureConfig::default());
        let result = catch_unwind(AssertUnwindSafe(|| {
            h.isolated(|h| {
                h.have_in_repository("User", [("name", "temp")]).unwrap();
                panic!("boom");
            })
        }));

        assert!(result.is_err());
        assert_eq!(h.store().count("User").unwrap(), 0);
        assert!(!h.store().in_transaction());
        assert!(logs_contain("Isolated test panicked"));
    }

    #[test]
    fn plan_errors_surface() {
        let h = harness(FixtureConfig::default());
        let err = h
            .count_in_repository("User", &query_spec! { "name" => { "x" => 1 } })
            .unwrap_err();
        assert!(matches!(err, FixtureError::Plan(PlanError::InvalidSpecShape(_))));

        let err = h.count_in_repository("Ghost", &QuerySpec::new()).unwrap_err();
        assert!(matches!(err, FixtureError::Plan(PlanError::UnknownEntity(_))));
    }
}
