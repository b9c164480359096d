//! Defines the `Dialect` trait for backend-specific query syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (an entity, field or alias name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - Object query language leaves identifiers bare: `s.name`
    /// - PostgreSQL uses double quotes: `"s"."name"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a literal value at position `index`.
    ///
    /// - Object query language uses `?1`, `?2`, etc.
    /// - PostgreSQL uses `$1`, `$2`, etc.
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the placeholder for a named parameter occupying slot
    /// `index`. Dialects without named parameters fall back to the
    /// positional form.
    fn named_placeholder(&self, name: &str, _index: usize) -> String {
        format!(":{name}")
    }

    /// Returns the name of the dialect (e.g., "DQL", "PostgreSQL").
    fn name(&self) -> String;
}

/// Object query language as spoken by document/object mappers:
/// `SELECT s FROM User AS s INNER JOIN s.Company AS Company WHERE ...`.
#[derive(Debug, Clone, Default)]
pub struct Dql;

impl Dialect for Dql {
    fn quote_identifier(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("?{}", index + 1)
    }

    fn name(&self) -> String {
        "DQL".into()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', "\"\""))
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn named_placeholder(&self, _name: &str, index: usize) -> String {
        self.get_placeholder(index)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}
