//! Defines the core rendering trait and context for converting an AST to a
//! query string.

use model::core::value::Value;

use crate::dialect::Dialect;

pub mod expr;
pub mod select;

/// A trait for any AST node that can be rendered into a query string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// One placeholder in the rendered query, in order of first appearance.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A literal value rendered in place of `Expr::Value`.
    Literal(Value),
    /// A named parameter; repeated uses share one slot.
    Named(String),
}

/// A context that holds the state during the rendering process.
///
/// Literals and named parameters share one placeholder sequence, so a
/// dialect with positional placeholders numbers them consistently.
pub struct Renderer<'a> {
    pub sql: String,
    pub slots: Vec<Slot>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            slots: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the query string and its slots.
    pub fn finish(self) -> (String, Vec<Slot>) {
        (self.sql, self.slots)
    }

    pub fn add_param(&mut self, value: Value) {
        self.slots.push(Slot::Literal(value));
        let placeholder = self.dialect.get_placeholder(self.slots.len() - 1);
        self.sql.push_str(&placeholder);
    }

    pub fn add_named_param(&mut self, name: &str) {
        let index = match self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Named(n) if n == name))
        {
            Some(index) => index,
            None => {
                self.slots.push(Slot::Named(name.to_string()));
                self.slots.len() - 1
            }
        };
        let placeholder = self.dialect.named_placeholder(name, index);
        self.sql.push_str(&placeholder);
    }
}

/// Renders `node` with `dialect` and returns the query string alone.
pub fn to_query_string(node: &dyn Render, dialect: &dyn Dialect) -> String {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.sql
}
