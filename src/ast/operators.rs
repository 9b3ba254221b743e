use std::fmt;

/// Comparison operators (`comp_op`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// SQL pattern match (`like`)
    Like,
    /// Case-insensitive pattern match (`ilike`)
    ILike,
}

/// Logical connectives (`join_op`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinOp {
    /// Logical AND (`&`)
    And,
    /// Logical OR (`|`)
    Or,
}

/// Spatial operators (`geom_op`).
///
/// Only produced by [`Predicate::new_from`](crate::ast::Predicate::new_from);
/// the expression syntax has no spelling for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomOp {
    Intersects,
}

impl CompOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompOp::Equal => "=",
            CompOp::NotEqual => "<>",
            CompOp::LessThan => "<",
            CompOp::LessEqual => "<=",
            CompOp::GreaterThan => ">",
            CompOp::GreaterEqual => ">=",
            CompOp::Like => "like",
            CompOp::ILike => "ilike",
        }
    }

    /// Looks an operator up by its spelling. Keywords match in any case and
    /// `!=` is accepted as an alias of `<>`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol.to_ascii_lowercase().as_str() {
            "=" => CompOp::Equal,
            "<>" | "!=" => CompOp::NotEqual,
            "<" => CompOp::LessThan,
            "<=" => CompOp::LessEqual,
            ">" => CompOp::GreaterThan,
            ">=" => CompOp::GreaterEqual,
            "like" => CompOp::Like,
            "ilike" => CompOp::ILike,
            _ => return None,
        };
        Some(op)
    }
}

impl JoinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            JoinOp::And => "&",
            JoinOp::Or => "|",
        }
    }

    /// SQL keyword used when joining generated fragments.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinOp::And => "AND",
            JoinOp::Or => "OR",
        }
    }
}

impl GeomOp {
    pub fn name(&self) -> &'static str {
        match self {
            GeomOp::Intersects => "intersects",
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for JoinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for GeomOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
