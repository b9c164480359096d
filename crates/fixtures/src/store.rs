//! A thread-safe, in-memory document store keyed by entity name.

use crate::error::FixtureError;
use model::{
    core::value::Value,
    metadata::{entity::EntityMetadata, provider::MetadataProvider, registry::SchemaRegistry},
    records::row::RowData,
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) type Collections = HashMap<String, Vec<RowData>>;

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) collections: Collections,
    /// Copy of `collections` taken when the active transaction began.
    snapshot: Option<Collections>,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    schema: Arc<SchemaRegistry>,
    pub(crate) state: Arc<RwLock<StoreState>>,
}

impl DocumentStore {
    /// Creates an empty store with one collection per registered entity.
    /// The schema must be closed: every association target registered.
    pub fn new(schema: SchemaRegistry) -> Result<Self, FixtureError> {
        schema.validate()?;
        let collections = schema
            .entity_names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        info!("Opened document store with {} collections", schema.len());
        Ok(Self {
            schema: Arc::new(schema),
            state: Arc::new(RwLock::new(StoreState {
                collections,
                snapshot: None,
            })),
        })
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub(crate) fn entity_meta(&self, entity: &str) -> Result<&EntityMetadata, FixtureError> {
        self.schema
            .entity(entity)
            .ok_or_else(|| FixtureError::UnknownCollection(entity.to_string()))
    }

    /// Stores `row` and returns its identifier. A missing or null
    /// identifier is replaced by a fresh UUID.
    pub fn insert(&self, mut row: RowData) -> Result<Value, FixtureError> {
        let meta = self.entity_meta(&row.entity)?;
        let mut id = row.get_value(&meta.identifier);
        if id.is_null() {
            id = Value::Uuid(Uuid::new_v4());
            row.set(meta.identifier.clone(), id.clone());
        }

        let mut state = self.state.write();
        let collection = state.collections.entry(row.entity.clone()).or_default();
        if collection
            .iter()
            .any(|existing| existing.get_value(&meta.identifier).equal(&id))
        {
            return Err(FixtureError::DuplicateIdentifier {
                entity: row.entity,
                id,
            });
        }

        debug!("Inserted `{}` document {}", row.entity, id);
        collection.push(row);
        Ok(id)
    }

    pub fn find_by_id(&self, entity: &str, id: &Value) -> Result<Option<RowData>, FixtureError> {
        let meta = self.entity_meta(entity)?;
        let state = self.state.read();
        Ok(state.collections.get(entity).and_then(|rows| {
            rows.iter()
                .find(|row| row.get_value(&meta.identifier).equal(id))
                .cloned()
        }))
    }

    /// Replaces the stored document that has the same identifier as `row`.
    pub fn update(&self, row: RowData) -> Result<(), FixtureError> {
        let meta = self.entity_meta(&row.entity)?;
        let id = row.get_value(&meta.identifier);
        let mut state = self.state.write();
        let slot = state
            .collections
            .get_mut(&row.entity)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|existing| existing.get_value(&meta.identifier).equal(&id))
            })
            .ok_or_else(|| FixtureError::NotFound(row.entity.clone()))?;
        *slot = row;
        Ok(())
    }

    /// Removes the document with identifier `id`; returns whether one existed.
    pub fn remove(&self, entity: &str, id: &Value) -> Result<bool, FixtureError> {
        let meta = self.entity_meta(entity)?;
        let mut state = self.state.write();
        let Some(rows) = state.collections.get_mut(entity) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| !row.get_value(&meta.identifier).equal(id));
        Ok(rows.len() != before)
    }

    pub fn all(&self, entity: &str) -> Result<Vec<RowData>, FixtureError> {
        self.entity_meta(entity)?;
        let state = self.state.read();
        Ok(state.collections.get(entity).cloned().unwrap_or_default())
    }

    pub fn count(&self, entity: &str) -> Result<usize, FixtureError> {
        self.entity_meta(entity)?;
        let state = self.state.read();
        Ok(state.collections.get(entity).map_or(0, Vec::len))
    }

    /// Empties one collection.
    pub fn clear(&self, entity: &str) -> Result<(), FixtureError> {
        self.entity_meta(entity)?;
        let mut state = self.state.write();
        if let Some(rows) = state.collections.get_mut(entity) {
            rows.clear();
        }
        Ok(())
    }

    pub fn begin_transaction(&self) -> Result<(), FixtureError> {
        let mut state = self.state.write();
        if state.snapshot.is_some() {
            return Err(FixtureError::TransactionActive);
        }
        state.snapshot = Some(state.collections.clone());
        debug!("Transaction started");
        Ok(())
    }

    pub fn commit(&self) -> Result<(), FixtureError> {
        let mut state = self.state.write();
        state
            .snapshot
            .take()
            .ok_or(FixtureError::NoActiveTransaction)?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Restores every collection to its state when the transaction began.
    pub fn rollback(&self) -> Result<(), FixtureError> {
        let mut state = self.state.write();
        let snapshot = state
            .snapshot
            .take()
            .ok_or(FixtureError::NoActiveTransaction)?;
        state.collections = snapshot;
        warn!("Transaction rolled back");
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.state.read().snapshot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::metadata::error::MetadataError;

    fn store() -> DocumentStore {
        let schema = SchemaRegistry::new()
            .with(EntityMetadata::new("User").scalar("name"))
            .unwrap();
        DocumentStore::new(schema).unwrap()
    }

    #[test]
    fn insert_assigns_identifier_when_missing() {
        let store = store();
        let id = store
            .insert(RowData::from_pairs("User", [("name", "A")]))
            .unwrap();

        assert!(matches!(id, Value::Uuid(_)));
        let found = store.find_by_id("User", &id).unwrap().unwrap();
        assert_eq!(found.get_value("name"), Value::from("A"));
    }

    #[test]
    fn insert_rejects_duplicate_identifiers_and_unknown_entities() {
        let store = store();
        store
            .insert(RowData::from_pairs("User", [("id", 1)]))
            .unwrap();

        assert!(matches!(
            store.insert(RowData::from_pairs("User", [("id", 1)])),
            Err(FixtureError::DuplicateIdentifier { .. })
        ));
        assert!(matches!(
            store.insert(RowData::from_pairs("Ghost", [("id", 1)])),
            Err(FixtureError::UnknownCollection(_))
        ));
    }

    #[test]
    fn update_and_remove_by_identifier() {
        let store = store();
        store
            .insert(RowData::from_pairs("User", [("id", Value::Int(1)), ("name", "A".into())]))
            .unwrap();

        store
            .update(RowData::from_pairs("User", [("id", Value::Int(1)), ("name", "B".into())]))
            .unwrap();
        let found = store.find_by_id("User", &Value::Int(1)).unwrap().unwrap();
        assert_eq!(found.get_value("name"), Value::from("B"));

        assert!(store.remove("User", &Value::Int(1)).unwrap());
        assert!(!store.remove("User", &Value::Int(1)).unwrap());
        assert_eq!(store.count("User").unwrap(), 0);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let store = store();
        store.insert(RowData::from_pairs("User", [("id", 1)])).unwrap();

        store.begin_transaction().unwrap();
        assert!(matches!(
            store.begin_transaction(),
            Err(FixtureError::TransactionActive)
        ));
        store.insert(RowData::from_pairs("User", [("id", 2)])).unwrap();
        store.clear("User").unwrap();
        store.rollback().unwrap();

        assert_eq!(store.count("User").unwrap(), 1);
        assert!(!store.in_transaction());
        assert!(matches!(store.rollback(), Err(FixtureError::NoActiveTransaction)));
    }

    #[test]
    fn commit_keeps_writes() {
        let store = store();
        store.begin_transaction().unwrap();
        store.insert(RowData::from_pairs("User", [("id", 1)])).unwrap();
        store.commit().unwrap();

        assert_eq!(store.count("User").unwrap(), 1);
        assert!(matches!(store.commit(), Err(FixtureError::NoActiveTransaction)));
    }

    #[test]
    fn open_schema_is_rejected() {
        let schema = SchemaRegistry::new()
            .with(EntityMetadata::new("Post").reference_one("author", "Author"))
            .unwrap();

        assert!(matches!(
            DocumentStore::new(schema),
            Err(FixtureError::Metadata(MetadataError::DanglingAssociation { .. }))
        ));
    }
}
