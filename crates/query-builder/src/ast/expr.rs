//! Defines the AST for query expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A field or alias identifier, e.g., `s` or `s.name`.
    Identifier(Ident),

    /// A literal value rendered as a positional placeholder.
    Value(Value),

    /// A named parameter, e.g. `:s_name`. The value is bound separately.
    Param(String),

    /// A binary operation, e.g., `s.name = :s_name` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// `expr IS NULL`
    IsNull(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // the 's' in 's.name'
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    And,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOperator::Eq, right)
    }

    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(Box::new(expr))
    }

    /// Folds conditions into a left-nested `AND` chain. `None` when empty.
    pub fn and_all(conditions: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        conditions
            .into_iter()
            .reduce(|acc, next| Self::binary(acc, BinaryOperator::And, next))
    }
}
