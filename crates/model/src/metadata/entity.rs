use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTIFIER: &str = "id";

/// How many documents an association field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// The field holds the identifier of a single referenced document.
    ReferenceOne,
    /// The field holds an array of identifiers.
    ReferenceMany,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Scalar,
    Association {
        target: String,
        cardinality: Cardinality,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldMetadata {
    pub fn is_association(&self) -> bool {
        matches!(self.kind, FieldKind::Association { .. })
    }

    /// Name of the referenced entity, if this field is an association.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Association { target, .. } => Some(target),
            FieldKind::Scalar => None,
        }
    }
}

/// Schema of one entity/collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    /// Field that uniquely identifies a document; association fields store
    /// values of this field.
    pub identifier: String,
    pub fields: Vec<FieldMetadata>,
    /// The identifier field was added by [`EntityMetadata::new`] and has
    /// not been declared by the caller.
    #[serde(skip)]
    implicit_identifier: bool,
}

impl EntityMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            identifier: DEFAULT_IDENTIFIER.to_string(),
            fields: vec![FieldMetadata {
                name: DEFAULT_IDENTIFIER.to_string(),
                kind: FieldKind::Scalar,
            }],
            implicit_identifier: true,
        }
    }

    /// Makes `identifier` the identifier field. The implicit `id` field is
    /// dropped; an `id` the caller declared stays as an ordinary field.
    pub fn identified_by(mut self, identifier: &str) -> Self {
        if self.implicit_identifier {
            let previous = std::mem::take(&mut self.identifier);
            self.fields.retain(|f| f.name != previous);
            self.implicit_identifier = false;
        }
        self.identifier = identifier.to_string();
        self.push(identifier, FieldKind::Scalar)
    }

    pub fn scalar(self, name: &str) -> Self {
        self.push(name, FieldKind::Scalar)
    }

    pub fn reference_one(self, name: &str, target: &str) -> Self {
        self.push(
            name,
            FieldKind::Association {
                target: target.to_string(),
                cardinality: Cardinality::ReferenceOne,
            },
        )
    }

    pub fn reference_many(self, name: &str, target: &str) -> Self {
        self.push(
            name,
            FieldKind::Association {
                target: target.to_string(),
                cardinality: Cardinality::ReferenceMany,
            },
        )
    }

    fn push(mut self, name: &str, kind: FieldKind) -> Self {
        if name == self.identifier {
            self.implicit_identifier = false;
        }
        let field = FieldMetadata {
            name: name.to_string(),
            kind,
        };
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn association(&self, name: &str) -> Option<&FieldMetadata> {
        self.field(name).filter(|f| f.is_association())
    }

    pub fn associations(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|f| f.is_association())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let user = EntityMetadata::new("User")
            .scalar("name")
            .reference_one("Company", "Company");

        let names: Vec<_> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "Company"]);
        assert_eq!(user.association("Company").and_then(|f| f.target()), Some("Company"));
        assert!(user.association("name").is_none());
    }

    #[test]
    fn redeclaring_a_field_replaces_it() {
        let user = EntityMetadata::new("User")
            .scalar("Company")
            .reference_many("Company", "Company");

        assert_eq!(user.fields.len(), 2);
        assert!(user.field("Company").is_some_and(|f| f.is_association()));
    }

    #[test]
    fn custom_identifier_replaces_default() {
        let doc = EntityMetadata::new("Tag").identified_by("slug");
        assert_eq!(doc.identifier, "slug");
        assert!(doc.field("id").is_none());
        assert!(doc.field("slug").is_some());
    }

    #[test]
    fn declared_id_survives_a_custom_identifier() {
        let country = EntityMetadata::new("Country")
            .scalar("id")
            .identified_by("code")
            .scalar("name");

        assert_eq!(country.identifier, "code");
        let names: Vec<_> = country.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "code", "name"]);
    }

    #[test]
    fn identifier_can_be_changed_twice() {
        let doc = EntityMetadata::new("Tag")
            .identified_by("slug")
            .identified_by("key");

        assert_eq!(doc.identifier, "key");
        assert!(doc.field("id").is_none());
        assert!(doc.field("slug").is_some(), "explicitly declared, so kept");
    }
}
