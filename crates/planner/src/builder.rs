//! The recursive association builder.
//!
//! Building happens in two passes. [`AssociationQueryBuilder::plan`] walks
//! the filter tree against metadata and produces the complete list of
//! [`Emission`]s, resolving join aliases and parameter names on the way.
//! Only when planning succeeds are the emissions replayed into the
//! accumulator, so a rejected filter never leaves partial joins or
//! bindings behind.

use crate::{
    config::BuilderConfig,
    error::PlanError,
    filter::{FilterNode, filters_depth, lower},
    spec::QuerySpec,
};
use model::{core::value::Value, metadata::provider::MetadataProvider};
use query_builder::accumulator::{QueryAccumulator, SelectAccumulator};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One call to make on the accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Join {
        parent_alias: String,
        field: String,
        alias: String,
    },
    Equals {
        alias: String,
        field: String,
        param: String,
        value: Value,
    },
    IsNull {
        alias: String,
        field: String,
    },
}

/// Builds filters against the entities described by `metadata`.
pub struct AssociationQueryBuilder<'a, M: MetadataProvider + ?Sized> {
    metadata: &'a M,
    config: BuilderConfig,
}

impl<'a, M: MetadataProvider + ?Sized> AssociationQueryBuilder<'a, M> {
    pub fn new(metadata: &'a M) -> Self {
        Self {
            metadata,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(metadata: &'a M, config: BuilderConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self { metadata, config })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Adds the constraints of `spec` to `builder`, which must already be
    /// scoped to `base_entity` under `alias`.
    pub fn build<A>(
        &self,
        base_entity: &str,
        alias: &str,
        spec: &QuerySpec,
        builder: &mut A,
    ) -> Result<(), PlanError>
    where
        A: QueryAccumulator + ?Sized,
    {
        self.check_depth(spec.depth())?;
        self.build_filters(base_entity, alias, &lower(spec), builder)
    }

    /// Same as [`build`](Self::build), for a filter tree assembled by the
    /// caller.
    pub fn build_filters<A>(
        &self,
        base_entity: &str,
        alias: &str,
        filters: &[(String, FilterNode)],
        builder: &mut A,
    ) -> Result<(), PlanError>
    where
        A: QueryAccumulator + ?Sized,
    {
        let emissions = self.plan(base_entity, alias, filters, builder)?;
        debug!(
            "Emitting {} operations for `{}` AS {}",
            emissions.len(),
            base_entity,
            alias
        );
        for emission in emissions {
            match emission {
                Emission::Join {
                    parent_alias,
                    field,
                    alias,
                } => builder.add_inner_join(&parent_alias, &field, &alias)?,
                Emission::Equals {
                    alias,
                    field,
                    param,
                    value,
                } => {
                    builder.add_equality_predicate(&alias, &field, &param)?;
                    builder.bind_parameter(&param, value)?;
                }
                Emission::IsNull { alias, field } => builder.add_null_predicate(&alias, &field)?,
            }
        }
        Ok(())
    }

    /// Starts a fresh query over `entity` under the configured root alias
    /// and applies `spec` to it.
    pub fn query(&self, entity: &str, spec: &QuerySpec) -> Result<SelectAccumulator, PlanError> {
        let mut accumulator = SelectAccumulator::new(entity, &self.config.root_alias);
        self.build(entity, &self.config.root_alias, spec, &mut accumulator)?;
        Ok(accumulator)
    }

    /// Validates `filters` and resolves every join alias and parameter name
    /// without touching `builder`.
    pub fn plan<A>(
        &self,
        base_entity: &str,
        alias: &str,
        filters: &[(String, FilterNode)],
        builder: &A,
    ) -> Result<Vec<Emission>, PlanError>
    where
        A: QueryAccumulator + ?Sized,
    {
        self.check_depth(filters_depth(filters))?;
        if !builder.is_alias_bound(alias) {
            return Err(query_builder::accumulator::AccumulatorError::UnknownAlias(
                alias.to_string(),
            )
            .into());
        }

        let mut planner = Planner {
            metadata: self.metadata,
            builder,
            aliases: HashSet::new(),
            params: HashSet::new(),
            emissions: Vec::new(),
        };
        planner.plan_level(base_entity, alias, filters, Level::Root)?;
        Ok(planner.emissions)
    }

    fn check_depth(&self, depth: usize) -> Result<(), PlanError> {
        if depth > self.config.max_depth {
            warn!(
                "Rejecting filter nested {} levels deep (max {})",
                depth, self.config.max_depth
            );
            return Err(PlanError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(())
    }
}

/// Builds `spec` into `builder` with the default configuration.
pub fn build<M, A>(
    metadata: &M,
    base_entity: &str,
    alias: &str,
    spec: &QuerySpec,
    builder: &mut A,
) -> Result<(), PlanError>
where
    M: MetadataProvider + ?Sized,
    A: QueryAccumulator + ?Sized,
{
    AssociationQueryBuilder::new(metadata).build(base_entity, alias, spec, builder)
}

/// Where a leaf sits decides how its parameter is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// Directly on the entity the build started from: `<alias>_<field>`.
    Root,
    /// Inside a join: `<joinAlias>__<field>`.
    Joined,
}

struct Planner<'p, M: MetadataProvider + ?Sized, A: QueryAccumulator + ?Sized> {
    metadata: &'p M,
    builder: &'p A,
    aliases: HashSet<String>,
    params: HashSet<String>,
    emissions: Vec<Emission>,
}

impl<M: MetadataProvider + ?Sized, A: QueryAccumulator + ?Sized> Planner<'_, M, A> {
    fn plan_level(
        &mut self,
        entity: &str,
        alias: &str,
        filters: &[(String, FilterNode)],
        level: Level,
    ) -> Result<(), PlanError> {
        let metadata = self.metadata;
        let meta = metadata
            .entity(entity)
            .ok_or_else(|| PlanError::UnknownEntity(entity.to_string()))?;

        for (field, node) in filters {
            if field.is_empty() {
                return Err(PlanError::InvalidSpecShape(format!(
                    "empty field name under `{alias}`"
                )));
            }

            match node {
                FilterNode::Equals(value) => {
                    if !is_scalar(value) {
                        return Err(PlanError::InvalidSpecShape(format!(
                            "`{alias}.{field}` holds {}; expected a scalar, null or mapping",
                            value.kind()
                        )));
                    }
                    let param = self.claim_param(alias, field, level)?;
                    self.emissions.push(Emission::Equals {
                        alias: alias.to_string(),
                        field: field.clone(),
                        param,
                        value: value.clone(),
                    });
                }
                FilterNode::IsNull => self.emissions.push(Emission::IsNull {
                    alias: alias.to_string(),
                    field: field.clone(),
                }),
                FilterNode::Join {
                    alias: wanted,
                    children,
                } => {
                    let Some(target) = meta.association(field).and_then(|f| f.target()) else {
                        return Err(PlanError::InvalidSpecShape(format!(
                            "`{}.{}` is not an association, it cannot take a nested filter",
                            meta.name, field
                        )));
                    };
                    if metadata.entity(target).is_none() {
                        return Err(PlanError::MetadataInconsistency {
                            entity: meta.name.clone(),
                            field: field.clone(),
                            target: target.to_string(),
                        });
                    }

                    let join_alias = self.claim_alias(wanted);
                    self.emissions.push(Emission::Join {
                        parent_alias: alias.to_string(),
                        field: field.clone(),
                        alias: join_alias.clone(),
                    });
                    self.plan_level(target, &join_alias, children, Level::Joined)?;
                }
            }
        }
        Ok(())
    }

    /// Picks `wanted`, or `wanted_2`, `wanted_3`, ... if the alias is taken
    /// by the accumulator or an earlier join of this build.
    fn claim_alias(&mut self, wanted: &str) -> String {
        let wanted = sanitize(wanted);
        let mut candidate = wanted.clone();
        let mut suffix = 1;
        while self.aliases.contains(&candidate) || self.builder.is_alias_bound(&candidate) {
            suffix += 1;
            candidate = format!("{wanted}_{suffix}");
        }
        if suffix > 1 {
            debug!("Alias `{}` is taken, joining as `{}`", wanted, candidate);
        }
        self.aliases.insert(candidate.clone());
        candidate
    }

    fn claim_param(&mut self, alias: &str, field: &str, level: Level) -> Result<String, PlanError> {
        let param = match level {
            Level::Root => sanitize(&format!("{alias}_{field}")),
            Level::Joined => sanitize(&format!("{alias}__{field}")),
        };
        if self.builder.is_parameter_bound(&param) || !self.params.insert(param.clone()) {
            return Err(PlanError::DuplicateParameterBinding(param));
        }
        Ok(param)
    }
}

/// Arrays and JSON containers cannot be bound to a single equality
/// predicate.
fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Array(_) => false,
        Value::Json(json) => !(json.is_array() || json.is_object()),
        _ => true,
    }
}

/// Strips `.` so a dotted field name still yields a valid parameter name.
fn sanitize(name: &str) -> String {
    name.replace('.', "")
}
