//! Defines the Abstract Syntax Tree (AST) for a SELECT query over an
//! entity and its association paths.

use crate::ast::{
    common::EntityRef,
    expr::{Expr, Ident},
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// The list of expressions to be returned.
    /// e.g., `s`, `s.name`
    pub columns: Vec<Expr>,

    /// The root entity of the query.
    /// e.g., `FROM User AS s`
    pub from: Option<FromClause>,

    /// Association paths joined into scope, in order.
    pub joins: Vec<JoinClause>,

    /// The WHERE clause condition.
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub entity: EntityRef,
    pub alias: String,
}

/// `INNER JOIN s.Company AS Company`: the association `path` is resolved
/// through metadata, so no `ON` condition is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub path: Ident,
    pub alias: String,
}
