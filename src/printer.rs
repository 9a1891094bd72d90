use std::fmt::{self, Write};

use crate::expr::{Expr, FALSE_LITERAL, NIL_LITERAL, TRUE_LITERAL};

/// Fully parenthesized prefix form of `expr`, e.g. `(* (group (+ 1 2)) 3)`.
pub fn print(expr: &Expr) -> String {
    expr.to_string()
}

fn parenthesize(f: &mut fmt::Formatter<'_>, name: &str, exprs: &[&Expr]) -> fmt::Result {
    f.write_char('(')?;
    f.write_str(name)?;
    for expr in exprs {
        f.write_char(' ')?;
        write!(f, "{expr}")?;
    }
    f.write_char(')')
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => match &**text {
                NIL_LITERAL => f.write_str("nil"),
                TRUE_LITERAL => f.write_str("true"),
                FALSE_LITERAL => f.write_str("false"),
                text => f.write_str(text),
            },
            Self::Grouping(inner) => parenthesize(f, "group", &[inner.as_ref()]),
            Self::Unary(op, x) => parenthesize(f, &op.lexeme, &[x.as_ref()]),
            Self::Binary(x, op, y) => parenthesize(f, &op.lexeme, &[x.as_ref(), y.as_ref()]),
        }
    }
}
