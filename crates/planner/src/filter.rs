//! Typed filter tree. Leaves constrain a field; `Join` nodes traverse an
//! association and constrain the joined entity.

use crate::spec::{QuerySpec, SpecValue};
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `field = value`
    Equals(Value),
    /// `field IS NULL`
    IsNull,
    /// Inner join along the association named by the field, bound to
    /// `alias`, with `children` applied to the joined entity.
    Join {
        alias: String,
        children: Vec<(String, FilterNode)>,
    },
}

impl FilterNode {
    pub fn equals(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => FilterNode::IsNull,
            value => FilterNode::Equals(value),
        }
    }

    pub fn join(alias: &str, children: Vec<(String, FilterNode)>) -> Self {
        FilterNode::Join {
            alias: alias.to_string(),
            children,
        }
    }

    /// Nesting levels below and including this node; leaves count as zero.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&FilterNode, usize)> = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            if let FilterNode::Join { children, .. } = node {
                deepest = deepest.max(level + 1);
                stack.extend(children.iter().map(|(_, child)| (child, level + 1)));
            }
        }
        deepest
    }
}

/// Depth of a filter list, counting the list itself as one level, so that it
/// agrees with [`QuerySpec::depth`] for lowered specs.
pub fn filters_depth(filters: &[(String, FilterNode)]) -> usize {
    1 + filters.iter().map(|(_, node)| node.depth()).max().unwrap_or(0)
}

/// Lowers a spec into a filter tree. Every nested mapping becomes a join
/// whose alias is the key it sits under; whether that key really is an
/// association is checked later against metadata.
pub fn lower(spec: &QuerySpec) -> Vec<(String, FilterNode)> {
    spec.iter()
        .map(|(key, value)| {
            let node = match value {
                SpecValue::Scalar(value) => FilterNode::Equals(value.clone()),
                SpecValue::Null => FilterNode::IsNull,
                SpecValue::Nested(inner) => FilterNode::join(key, lower(inner)),
            };
            (key.to_string(), node)
        })
        .collect()
}
