use model::{core::value::Value, metadata::error::MetadataError};
use planner::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("no collection is registered for entity `{0}`")]
    UnknownCollection(String),

    #[error("`{entity}` already holds a document with identifier {id}")]
    DuplicateIdentifier { entity: String, id: Value },

    #[error("query references parameter `{0}` but never binds it")]
    UnboundParameter(String),

    #[error("query references alias `{0}` before it is joined")]
    UnknownAlias(String),

    #[error("`{entity}.{field}` is not an association")]
    NotAnAssociation { entity: String, field: String },

    #[error("no transaction is active")]
    NoActiveTransaction,

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("no `{0}` document matches the filter")]
    NotFound(String),

    #[error("cannot hydrate `{entity}.{field}`: {reason}")]
    Hydration {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("store factory failed: {0}")]
    Factory(String),

    #[error("invalid fixture configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}
