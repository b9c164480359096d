//! The caller-facing filter description: a nested mapping of field names.

use crate::error::PlanError;
use indexmap::IndexMap;
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    Scalar(Value),
    Null,
    /// Traverse the association named by the key and filter the joined
    /// entity with the nested mapping.
    Nested(QuerySpec),
}

impl From<Value> for SpecValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => SpecValue::Null,
            value => SpecValue::Scalar(value),
        }
    }
}

macro_rules! spec_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SpecValue {
                fn from(v: $ty) -> Self {
                    SpecValue::from(Value::from(v))
                }
            }
        )*
    };
}

spec_value_from!(&str, String, i32, i64, u64, f64, bool, uuid::Uuid);

impl<T: Into<Value>> From<Option<T>> for SpecValue {
    fn from(v: Option<T>) -> Self {
        SpecValue::from(v.map_or(Value::Null, Into::into))
    }
}

impl From<QuerySpec> for SpecValue {
    fn from(spec: QuerySpec) -> Self {
        SpecValue::Nested(spec)
    }
}

/// Mapping from field name to [`SpecValue`]. Keys are unique; iteration
/// follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    entries: IndexMap<String, SpecValue>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Option<SpecValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SpecValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mapping levels, counting this one. Walks iteratively so a
    /// hostile nesting depth cannot overflow the stack here.
    pub fn depth(&self) -> usize {
        let mut deepest = 1;
        let mut stack: Vec<(&QuerySpec, usize)> = vec![(self, 1)];
        while let Some((spec, level)) = stack.pop() {
            deepest = deepest.max(level);
            for value in spec.entries.values() {
                if let SpecValue::Nested(inner) = value {
                    stack.push((inner, level + 1));
                }
            }
        }
        deepest
    }
}

impl<'a> IntoIterator for &'a QuerySpec {
    type Item = (&'a String, &'a SpecValue);
    type IntoIter = indexmap::map::Iter<'a, String, SpecValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl TryFrom<serde_json::Value> for QuerySpec {
    type Error = PlanError;

    /// Reads a spec from a JSON object. Objects nest, `null` is `Null`,
    /// other scalars become values; arrays and empty keys are rejected.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Object(map) => {
                let mut spec = QuerySpec::new();
                for (key, value) in map {
                    if key.is_empty() {
                        return Err(PlanError::InvalidSpecShape(
                            "field names must not be empty".into(),
                        ));
                    }
                    let value = match value {
                        serde_json::Value::Null => SpecValue::Null,
                        serde_json::Value::Array(_) => {
                            return Err(PlanError::InvalidSpecShape(format!(
                                "`{key}` holds an array; expected a scalar, null or mapping"
                            )));
                        }
                        nested @ serde_json::Value::Object(_) => {
                            SpecValue::Nested(QuerySpec::try_from(nested)?)
                        }
                        scalar => SpecValue::Scalar(Value::from(scalar)),
                    };
                    spec.entries.insert(key, value);
                }
                Ok(spec)
            }
            other => Err(PlanError::InvalidSpecShape(format!(
                "expected a mapping at the top level, found `{other}`"
            ))),
        }
    }
}

impl std::str::FromStr for QuerySpec {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let json: serde_json::Value =
            serde_json::from_str(s).map_err(|e| PlanError::InvalidSpecShape(e.to_string()))?;
        QuerySpec::try_from(json)
    }
}
