use crate::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, Ident},
    render::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::Param(name) => r.add_named_param(name),
            Expr::BinaryOp(op) => op.render(r),
            Expr::IsNull(expr) => {
                expr.render(r);
                r.sql.push_str(" IS NULL");
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        r.sql.push_str(match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::And => " AND ",
        });

        self.right.render(r);
        r.sql.push(')');
    }
}
