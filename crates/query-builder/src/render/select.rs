use crate::{
    ast::select::{FromClause, JoinClause, Select},
    render::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        r.sql.push_str(&r.dialect.quote_identifier(&self.entity.name));
        r.sql.push_str(" AS ");
        r.sql.push_str(&r.dialect.quote_identifier(&self.alias));
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INNER JOIN ");
        self.path.render(r);
        r.sql.push_str(" AS ");
        r.sql.push_str(&r.dialect.quote_identifier(&self.alias));
    }
}
