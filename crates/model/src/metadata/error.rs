use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("entity `{0}` is registered twice")]
    DuplicateEntity(String),

    #[error("association `{entity}.{field}` targets unregistered entity `{target}`")]
    DanglingAssociation {
        entity: String,
        field: String,
        target: String,
    },
}
