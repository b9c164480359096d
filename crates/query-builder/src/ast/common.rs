//! Defines common, reusable AST nodes for building queries.

/// The entity (collection) a query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub name: String,
}
