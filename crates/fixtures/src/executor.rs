//! Runs a [`BoundQuery`] against a [`DocumentStore`].
//!
//! Joins follow stored references: a reference-one field holds the
//! identifier of the target document, a reference-many field an array of
//! identifiers. Inner-join semantics apply, so a document whose reference
//! is null or dangling drops out. Equality against an array field matches
//! when any element is equal.

use crate::{
    error::FixtureError,
    store::{Collections, DocumentStore},
};
use model::{
    core::value::Value,
    metadata::entity::{Cardinality, EntityMetadata, FieldKind},
    records::row::RowData,
};
use query_builder::accumulator::{BoundQuery, Condition, PathJoin, Predicate};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// One candidate result: the root document (by position in its
/// collection) plus the document bound to every alias so far.
type Tuple<'r> = (usize, Vec<&'r RowData>);

impl DocumentStore {
    /// Returns the distinct root documents that satisfy every join and
    /// predicate of `query`, in insertion order.
    pub fn execute(&self, query: &BoundQuery) -> Result<Vec<RowData>, FixtureError> {
        if let Some(param) = query.unbound_parameters().first() {
            return Err(FixtureError::UnboundParameter(param.to_string()));
        }

        let root_meta = self.entity_meta(&query.entity)?;
        let state = self.state.read();
        let collection = |entity: &str| rows_of(&state.collections, entity);

        let mut scope: HashMap<&str, (usize, &EntityMetadata)> = HashMap::new();
        scope.insert(query.alias.as_str(), (0, root_meta));

        let mut tuples: Vec<Tuple> = collection(&query.entity)
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx, vec![row]))
            .collect();

        for join in &query.joins {
            let (parent_slot, parent_meta) = *scope
                .get(join.parent_alias.as_str())
                .ok_or_else(|| FixtureError::UnknownAlias(join.parent_alias.clone()))?;
            let (target_meta, cardinality) = self.resolve_join(parent_meta, join)?;
            let targets = collection(&target_meta.name);

            tuples = tuples
                .into_iter()
                .flat_map(|(root, bound)| {
                    let reference = bound[parent_slot].get_value(&join.field);
                    referenced_ids(&reference, cardinality)
                        .into_iter()
                        .flat_map(|id| {
                            targets
                                .iter()
                                .filter(move |row| row.get_value(&target_meta.identifier).equal(&id))
                        })
                        .map(|row| {
                            let mut extended = bound.clone();
                            extended.push(row);
                            (root, extended)
                        })
                        .collect::<Vec<_>>()
                })
                .collect();

            scope.insert(join.alias.as_str(), (scope.len(), target_meta));
        }

        let mut matched: Vec<usize> = Vec::new();
        let mut seen = HashSet::new();
        for (root, bound) in &tuples {
            if seen.contains(root) {
                continue;
            }
            if satisfies(query, &scope, bound)? {
                seen.insert(*root);
                matched.push(*root);
            }
        }

        let roots = collection(&query.entity);
        let rows: Vec<RowData> = matched.into_iter().map(|idx| roots[idx].clone()).collect();
        info!(
            "Query over `{}` matched {} of {} documents",
            query.entity,
            rows.len(),
            roots.len()
        );
        Ok(rows)
    }

    fn resolve_join(
        &self,
        parent: &EntityMetadata,
        join: &PathJoin,
    ) -> Result<(&EntityMetadata, Cardinality), FixtureError> {
        match parent.field(&join.field).map(|f| &f.kind) {
            Some(FieldKind::Association {
                target,
                cardinality,
            }) => Ok((self.entity_meta(target)?, *cardinality)),
            _ => Err(FixtureError::NotAnAssociation {
                entity: parent.name.clone(),
                field: join.field.clone(),
            }),
        }
    }
}

fn rows_of<'s>(collections: &'s Collections, entity: &str) -> &'s [RowData] {
    collections.get(entity).map(Vec::as_slice).unwrap_or(&[])
}

fn referenced_ids(reference: &Value, cardinality: Cardinality) -> Vec<Value> {
    match (cardinality, reference) {
        (_, Value::Null) => Vec::new(),
        (Cardinality::ReferenceMany, Value::Array(ids)) => ids.clone(),
        (_, id) => vec![id.clone()],
    }
}

fn satisfies(
    query: &BoundQuery,
    scope: &HashMap<&str, (usize, &EntityMetadata)>,
    bound: &[&RowData],
) -> Result<bool, FixtureError> {
    for Predicate {
        alias,
        field,
        condition,
    } in &query.predicates
    {
        let (slot, _) = scope
            .get(alias.as_str())
            .ok_or_else(|| FixtureError::UnknownAlias(alias.clone()))?;
        let actual = bound[*slot].get_value(field);
        let holds = match condition {
            Condition::IsNull => actual.is_null(),
            Condition::Equals { param } => {
                let expected = query
                    .param(param)
                    .ok_or_else(|| FixtureError::UnboundParameter(param.clone()))?;
                matches_value(&actual, expected)
            }
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_value(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Array(items), scalar) if !matches!(scalar, Value::Array(_)) => {
            items.iter().any(|item| item.equal(scalar))
        }
        _ => actual.equal(expected),
    }
}
