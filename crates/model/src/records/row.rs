use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// A single document of `entity`, as an ordered list of field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    /// Builds a row from `(field, value)` pairs.
    pub fn from_pairs<K, V, I>(entity: &str, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = RowData::new(entity, Vec::new());
        for (name, value) in pairs {
            row.set(name, value);
        }
        row
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values.iter().find(|f| f.name == field)
    }

    /// Value of `field`, or `Value::Null` when the document lacks it.
    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let name = field.into();
        let value = value.into();
        match self.field_values.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.field_values.push(FieldValue { name, value }),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_existing_field() {
        let mut row = RowData::from_pairs("User", [("name", "A")]);
        row.set("name", "B");
        row.set("age", 30);

        assert_eq!(row.field_values.len(), 2);
        assert_eq!(row.get_value("name"), Value::String("B".into()));
        assert_eq!(row.get_value("age"), Value::Int(30));
    }

    #[test]
    fn missing_field_reads_as_null() {
        let row = RowData::new("User", vec![]);
        assert!(!row.contains("name"));
        assert_eq!(row.get_value("name"), Value::Null);
    }
}
