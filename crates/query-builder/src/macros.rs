#[macro_export]
macro_rules! entity_ref {
    ($name:expr) => {
        $crate::ast::common::EntityRef {
            name: $name.to_string(),
        }
    };
}

#[macro_export]
macro_rules! ident {
    ($name:expr) => {
        $crate::ast::expr::Expr::Identifier($crate::ast::expr::Ident {
            qualifier: None,
            name: $name.to_string(),
        })
    };
    ($qualifier:expr, $name:expr) => {
        $crate::ast::expr::Expr::Identifier($crate::ast::expr::Ident {
            qualifier: Some($qualifier.to_string()),
            name: $name.to_string(),
        })
    };
}

/// Association path such as `s.Company`, the target of a path join.
#[macro_export]
macro_rules! path {
    ($qualifier:expr, $name:expr) => {
        $crate::ast::expr::Ident {
            qualifier: Some($qualifier.to_string()),
            name: $name.to_string(),
        }
    };
}
