//! The mutable collector that association filters are emitted into.
//!
//! A [`SelectAccumulator`] starts scoped to one root entity under one alias
//! and records path joins, predicates and named parameter bindings. It can
//! be rendered to a query string or handed to an executor as a
//! [`BoundQuery`].

use crate::{
    ast::{expr::Expr, select::Select},
    build::select::SelectBuilder,
    dialect::{Dialect, Dql},
    entity_ref, ident, param, path, qual_ident,
    render::{Render, Renderer, Slot, to_query_string},
};
use model::core::value::Value;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("parameter `{0}` is already bound")]
    DuplicateParameter(String),

    #[error("alias `{0}` is not bound in this query")]
    UnknownAlias(String),

    #[error("alias `{0}` is already bound in this query")]
    DuplicateAlias(String),

    #[error("parameter `{0}` is referenced but never bound")]
    UnboundParameter(String),
}

/// An inner join along the association `parent_alias.field`, bringing the
/// referenced entity into scope as `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathJoin {
    pub parent_alias: String,
    pub field: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// `alias.field = :param`
    Equals { param: String },
    /// `alias.field IS NULL`
    IsNull,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub alias: String,
    pub field: String,
    pub condition: Condition,
}

impl Predicate {
    fn to_expr(&self) -> Expr {
        let field = qual_ident(&self.alias, &self.field);
        match &self.condition {
            Condition::Equals { param: name } => Expr::equals(field, param(name)),
            Condition::IsNull => Expr::is_null(field),
        }
    }
}

/// The finished state of an accumulator: everything an executor needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundQuery {
    pub entity: String,
    pub alias: String,
    pub joins: Vec<PathJoin>,
    pub predicates: Vec<Predicate>,
    /// Bound parameters in binding order.
    pub params: Vec<(String, Value)>,
}

impl BoundQuery {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Parameters referenced by a predicate but never bound.
    pub fn unbound_parameters(&self) -> Vec<&str> {
        self.predicates
            .iter()
            .filter_map(|p| match &p.condition {
                Condition::Equals { param } if self.param(param).is_none() => Some(param.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Aliases in scope, root first, then in join order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.alias.as_str()).chain(self.joins.iter().map(|j| j.alias.as_str()))
    }

    pub fn to_select(&self) -> Select {
        let mut builder = SelectBuilder::new()
            .select(vec![ident!(self.alias)])
            .from(entity_ref!(self.entity), &self.alias);

        for join in &self.joins {
            builder = builder.join(path!(join.parent_alias, join.field), &join.alias);
        }

        if let Some(condition) = Expr::and_all(self.predicates.iter().map(Predicate::to_expr)) {
            builder = builder.where_clause(condition);
        }

        builder.build()
    }

    pub fn render(&self, dialect: &dyn Dialect) -> String {
        to_query_string(&self.to_select(), dialect)
    }

    /// Renders the query together with the values for its placeholders, in
    /// placeholder order, ready for a driver that binds positionally.
    pub fn render_with_params(
        &self,
        dialect: &dyn Dialect,
    ) -> Result<(String, Vec<Value>), AccumulatorError> {
        let mut renderer = Renderer::new(dialect);
        self.to_select().render(&mut renderer);
        let (sql, slots) = renderer.finish();

        let values = slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Literal(value) => Ok(value),
                Slot::Named(name) => self
                    .param(&name)
                    .cloned()
                    .ok_or(AccumulatorError::UnboundParameter(name)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Rendered `{}` query for {} with {} parameters",
            self.entity,
            dialect.name(),
            values.len()
        );
        Ok((sql, values))
    }
}

/// The operations an association filter needs from a query under
/// construction.
pub trait QueryAccumulator {
    fn add_inner_join(
        &mut self,
        parent_alias: &str,
        field: &str,
        new_alias: &str,
    ) -> Result<(), AccumulatorError>;

    fn add_equality_predicate(
        &mut self,
        alias: &str,
        field: &str,
        param: &str,
    ) -> Result<(), AccumulatorError>;

    fn add_null_predicate(&mut self, alias: &str, field: &str) -> Result<(), AccumulatorError>;

    /// Binds `value` to `param`. Binding the same name twice is an error,
    /// never an overwrite.
    fn bind_parameter(&mut self, param: &str, value: Value) -> Result<(), AccumulatorError>;

    fn is_alias_bound(&self, alias: &str) -> bool;

    fn is_parameter_bound(&self, param: &str) -> bool;

    fn to_query_string(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectAccumulator {
    query: BoundQuery,
}

impl SelectAccumulator {
    /// Starts a query over `entity`, bound to `alias`.
    pub fn new(entity: &str, alias: &str) -> Self {
        Self {
            query: BoundQuery {
                entity: entity.to_string(),
                alias: alias.to_string(),
                joins: Vec::new(),
                predicates: Vec::new(),
                params: Vec::new(),
            },
        }
    }

    pub fn entity(&self) -> &str {
        &self.query.entity
    }

    pub fn alias(&self) -> &str {
        &self.query.alias
    }

    pub fn joins(&self) -> &[PathJoin] {
        &self.query.joins
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.query.predicates
    }

    pub fn params(&self) -> &[(String, Value)] {
        &self.query.params
    }

    pub fn query(&self) -> &BoundQuery {
        &self.query
    }

    pub fn finish(self) -> BoundQuery {
        self.query
    }

    fn ensure_alias(&self, alias: &str) -> Result<(), AccumulatorError> {
        if self.is_alias_bound(alias) {
            Ok(())
        } else {
            Err(AccumulatorError::UnknownAlias(alias.to_string()))
        }
    }
}

impl QueryAccumulator for SelectAccumulator {
    fn add_inner_join(
        &mut self,
        parent_alias: &str,
        field: &str,
        new_alias: &str,
    ) -> Result<(), AccumulatorError> {
        self.ensure_alias(parent_alias)?;
        if self.is_alias_bound(new_alias) {
            return Err(AccumulatorError::DuplicateAlias(new_alias.to_string()));
        }
        debug!("JOIN {}.{} AS {}", parent_alias, field, new_alias);
        self.query.joins.push(PathJoin {
            parent_alias: parent_alias.to_string(),
            field: field.to_string(),
            alias: new_alias.to_string(),
        });
        Ok(())
    }

    fn add_equality_predicate(
        &mut self,
        alias: &str,
        field: &str,
        param: &str,
    ) -> Result<(), AccumulatorError> {
        self.ensure_alias(alias)?;
        debug!("WHERE {}.{} = :{}", alias, field, param);
        self.query.predicates.push(Predicate {
            alias: alias.to_string(),
            field: field.to_string(),
            condition: Condition::Equals {
                param: param.to_string(),
            },
        });
        Ok(())
    }

    fn add_null_predicate(&mut self, alias: &str, field: &str) -> Result<(), AccumulatorError> {
        self.ensure_alias(alias)?;
        debug!("WHERE {}.{} IS NULL", alias, field);
        self.query.predicates.push(Predicate {
            alias: alias.to_string(),
            field: field.to_string(),
            condition: Condition::IsNull,
        });
        Ok(())
    }

    fn bind_parameter(&mut self, param: &str, value: Value) -> Result<(), AccumulatorError> {
        if self.is_parameter_bound(param) {
            return Err(AccumulatorError::DuplicateParameter(param.to_string()));
        }
        self.query.params.push((param.to_string(), value));
        Ok(())
    }

    fn is_alias_bound(&self, alias: &str) -> bool {
        self.query.aliases().any(|a| a == alias)
    }

    fn is_parameter_bound(&self, param: &str) -> bool {
        self.query.param(param).is_some()
    }

    fn to_query_string(&self) -> String {
        self.query.render(&Dql)
    }
}
