//! Query AST, typestate builder and renderer for association queries,
//! plus the [`accumulator`] that filters are emitted into.

use crate::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod accumulator;
pub mod ast;
pub mod build;
pub mod dialect;
pub mod macros;
pub mod render;

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: None,
        name: name.to_string(),
    })
}

pub fn qual_ident(qualifier: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(qualifier.to_string()),
        name: name.to_string(),
    })
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}

pub fn param(name: &str) -> Expr {
    Expr::Param(name.to_string())
}
