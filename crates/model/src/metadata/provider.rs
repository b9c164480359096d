use super::entity::EntityMetadata;
use std::collections::BTreeMap;

/// Read-only access to entity metadata, keyed by entity name.
///
/// Implementations must return consistent answers for the duration of a
/// single query build.
pub trait MetadataProvider {
    fn entity(&self, name: &str) -> Option<&EntityMetadata>;

    /// Association fields of `name`, mapped to their target entity.
    /// `None` when the entity is unknown.
    fn associations(&self, name: &str) -> Option<BTreeMap<String, String>> {
        self.entity(name).map(|meta| {
            meta.associations()
                .filter_map(|f| f.target().map(|t| (f.name.clone(), t.to_string())))
                .collect()
        })
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn entity(&self, name: &str) -> Option<&EntityMetadata> {
        (**self).entity(name)
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for std::sync::Arc<P> {
    fn entity(&self, name: &str) -> Option<&EntityMetadata> {
        (**self).entity(name)
    }
}
