use super::{entity::EntityMetadata, error::MetadataError, provider::MetadataProvider};
use std::collections::HashMap;
use tracing::debug;

/// In-memory metadata provider.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntityMetadata>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, meta: EntityMetadata) -> Result<(), MetadataError> {
        if self.entities.contains_key(&meta.name) {
            return Err(MetadataError::DuplicateEntity(meta.name));
        }
        debug!("Registering entity `{}` ({} fields)", meta.name, meta.fields.len());
        self.entities.insert(meta.name.clone(), meta);
        Ok(())
    }

    pub fn with(mut self, meta: EntityMetadata) -> Result<Self, MetadataError> {
        self.register(meta)?;
        Ok(self)
    }

    /// Checks that every association points at a registered entity.
    ///
    /// Registration is order-independent, so dangling targets can only be
    /// detected once the whole schema is known.
    pub fn validate(&self) -> Result<(), MetadataError> {
        let mut names: Vec<&String> = self.entities.keys().collect();
        names.sort();
        for name in names {
            let meta = &self.entities[name];
            for field in meta.associations() {
                if let Some(target) = field.target()
                    && !self.entities.contains_key(target)
                {
                    return Err(MetadataError::DanglingAssociation {
                        entity: meta.name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl MetadataProvider for SchemaRegistry {
    fn entity(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities.get(name)
    }
}
