//! Typestate builder for [`Select`] ASTs.
//!
//! `SELECT` must come first and `FROM` second; joins and conditions are
//! only available once the root entity is known.

use crate::ast::{
    common::EntityRef,
    expr::{Expr, Ident},
    select::{FromClause, JoinClause, Select},
};

#[derive(Debug, Default, Clone)]
pub struct InitialState;

#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The root entity is bound; joins and conditions may follow.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

impl SelectBuilder<SelectState> {
    pub fn from(mut self, entity: EntityRef, alias: &str) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            entity,
            alias: alias.to_string(),
        });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Joins the association `path` (e.g. `s.Company`) as `alias`.
    pub fn join(mut self, path: Ident, alias: &str) -> Self {
        self.ast.joins.push(JoinClause {
            path,
            alias: alias.to_string(),
        });
        self
    }

    /// Sets the `WHERE` clause, replacing any previous condition.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// Combines `condition` with the existing `WHERE` clause using `AND`.
    pub fn and_where(mut self, condition: Expr) -> Self {
        self.ast.where_clause =
            Expr::and_all(self.ast.where_clause.take().into_iter().chain([condition]));
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
