//! Explicit conversion between typed test entities and stored documents.

use crate::error::FixtureError;
use model::{core::value::Value, records::row::RowData};
use uuid::Uuid;

/// Binds a Rust type to the entity name it is stored under.
pub trait Entity {
    const NAME: &'static str;
}

pub trait Hydrate: Entity + Sized {
    fn from_row(row: &RowData) -> Result<Self, FixtureError>;
}

pub trait Persist: Entity {
    fn to_row(&self) -> RowData;
}

/// Typed accessors over a [`RowData`] for use in [`Hydrate`] impls.
///
/// Every accessor reports a [`FixtureError::Hydration`] naming the entity
/// and field when the value is missing or of the wrong kind.
pub struct FieldReader<'r> {
    row: &'r RowData,
}

impl<'r> FieldReader<'r> {
    pub fn new(row: &'r RowData) -> Self {
        Self { row }
    }

    fn error(&self, field: &str, reason: impl Into<String>) -> FixtureError {
        FixtureError::Hydration {
            entity: self.row.entity.clone(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn mismatch(&self, field: &str, expected: &str, found: &Value) -> FixtureError {
        self.error(field, format!("expected {expected}, found {}", found.kind()))
    }

    pub fn value(&self, field: &str) -> Result<&'r Value, FixtureError> {
        match self.row.get(field) {
            Some(fv) if !fv.value.is_null() => Ok(&fv.value),
            _ => Err(self.error(field, "field is missing or null")),
        }
    }

    pub fn optional(&self, field: &str) -> Option<&'r Value> {
        self.row
            .get(field)
            .map(|fv| &fv.value)
            .filter(|v| !v.is_null())
    }

    pub fn string(&self, field: &str) -> Result<String, FixtureError> {
        match self.value(field)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(field, "string", other)),
        }
    }

    pub fn optional_string(&self, field: &str) -> Result<Option<String>, FixtureError> {
        match self.optional(field) {
            None => Ok(None),
            Some(_) => self.string(field).map(Some),
        }
    }

    pub fn int(&self, field: &str) -> Result<i64, FixtureError> {
        match self.value(field)? {
            Value::Int(v) => Ok(*v),
            Value::Uint(v) => {
                i64::try_from(*v).map_err(|_| self.error(field, format!("{v} overflows i64")))
            }
            other => Err(self.mismatch(field, "integer", other)),
        }
    }

    pub fn float(&self, field: &str) -> Result<f64, FixtureError> {
        let value = self.value(field)?;
        value
            .as_f64()
            .ok_or_else(|| self.mismatch(field, "number", value))
    }

    pub fn bool(&self, field: &str) -> Result<bool, FixtureError> {
        match self.value(field)? {
            Value::Boolean(b) => Ok(*b),
            other => Err(self.mismatch(field, "boolean", other)),
        }
    }

    /// Accepts both `Value::Uuid` and its hyphenated string form.
    pub fn uuid(&self, field: &str) -> Result<Uuid, FixtureError> {
        match self.value(field)? {
            Value::Uuid(id) => Ok(*id),
            Value::String(s) => {
                Uuid::parse_str(s).map_err(|e| self.error(field, e.to_string()))
            }
            other => Err(self.mismatch(field, "uuid", other)),
        }
    }

    /// Identifiers held by a reference-many field. A missing field reads
    /// as no references.
    pub fn references(&self, field: &str) -> Result<Vec<Value>, FixtureError> {
        match self.optional(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(ids)) => Ok(ids.clone()),
            Some(other) => Err(self.mismatch(field, "array", other)),
        }
    }
}
