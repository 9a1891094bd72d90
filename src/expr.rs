use std::{fmt, rc::Rc};

use thiserror::Error;

use crate::token::{Token, TokenType};

// A string literal never contains '"', so no STRING token can spell these.
/// Literal text the parser stores for the `true` keyword.
pub const TRUE_LITERAL: &str = "\"true\"";
/// Literal text the parser stores for the `false` keyword.
pub const FALSE_LITERAL: &str = "\"false\"";
/// Literal text the parser stores for the `nil` keyword.
pub const NIL_LITERAL: &str = "";

#[derive(Debug, PartialEq, Clone)]
pub enum Val {
    Num(f64),
    Bool(bool),
    String(Rc<str>),
}

impl Val {
    /// Everything except `false` is truthy.
    pub fn truthy(&self) -> bool {
        !matches!(self, Val::Bool(false))
    }

    /// Types a literal's text: number first, then the boolean markers, then text.
    ///
    /// The order matters: a string literal whose contents start with a number
    /// evaluates to that number (`"42abc"` is 42).
    pub fn from_literal(text: &str) -> Val {
        if let Some(num) = leading_number(text) {
            Val::Num(num)
        } else if text == TRUE_LITERAL {
            Val::Bool(true)
        } else if text == FALSE_LITERAL {
            Val::Bool(false)
        } else {
            Val::String(text.into())
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String(x) => write!(f, "{}", x),
            Self::Num(x) => write!(f, "{}", format_number(*x, 5)),
            Self::Bool(x) => write!(f, "{}", x),
        }
    }
}

/// Reads a number off the front of `text` like C's `strtod`: leading
/// whitespace is skipped and anything after the longest numeric prefix is
/// ignored. Decimal notation plus `inf`, `infinity` and `nan`; no hex floats.
fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let rest = &s[end..];
    for word in ["infinity", "inf", "nan"] {
        if rest
            .get(..word.len())
            .is_some_and(|w| w.eq_ignore_ascii_case(word))
        {
            return s[..end + word.len()].parse().ok();
        }
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse().ok()
}

/// Renders `x` with `precision` significant digits the way C's `%g` does:
/// fixed notation for moderate exponents, scientific otherwise, trailing
/// zeros removed.
fn format_number(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.into();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.into();
    }

    let precision = precision.max(1);
    // Rounding to `precision` digits can bump the exponent (99999.5 -> 1e5),
    // so read it back from the rounded scientific form.
    let sci = format!("{:.*e}", precision - 1, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            sign,
            exp.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub type ExprRef = Box<Expr>;

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    /// Raw literal text, typed only when evaluated (see [`Val::from_literal`]).
    Literal(Rc<str>),
    Grouping(ExprRef),
    Unary(Token, ExprRef),
    Binary(ExprRef, Token, ExprRef),
}

impl Expr {
    pub fn literal(text: impl Into<Rc<str>>) -> Self {
        Self::Literal(text.into())
    }

    pub fn grouping(inner: Expr) -> Self {
        Self::Grouping(Box::new(inner))
    }

    pub fn unary(op: Token, operand: Expr) -> Self {
        Self::Unary(op, Box::new(operand))
    }

    pub fn binary(left: Expr, op: Token, right: Expr) -> Self {
        Self::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn eval(&self) -> Result<Val, EvalErr> {
        match self {
            Self::Literal(text) => Ok(Val::from_literal(text)),
            Self::Grouping(inner) => inner.eval(),
            Self::Unary(op, x) => {
                let l = x.eval()?;
                match (op.kind, l) {
                    (TokenType::Minus, Val::Num(a)) => Ok(Val::Num(-a)),
                    (TokenType::Minus, _) => Err(RuntimeErr::OperandNotNumber(op.line).into()),
                    (TokenType::Bang, a) => Ok(Val::Bool(!a.truthy())),
                    _ => Err(InternalErr::NotUnaryOperator(op.lexeme.clone(), op.line).into()),
                }
            }
            Self::Binary(x, op, y) => {
                let l = x.eval()?;
                let r = y.eval()?;
                match (op.kind, l, r) {
                    (TokenType::Plus, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a + b)),
                    (TokenType::Plus, Val::String(a), Val::String(b)) => {
                        let mut c = a.to_string();
                        c.push_str(&b);
                        Ok(Val::String(c.into()))
                    }
                    (TokenType::Plus, ..) => Err(RuntimeErr::OperandsNotAddable(op.line).into()),

                    (TokenType::Minus, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a - b)),
                    (TokenType::Star, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a * b)),
                    // No zero check: division follows IEEE 754 (inf, nan).
                    (TokenType::Slash, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a / b)),

                    (TokenType::Less, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a < b)),
                    (TokenType::LessEqual, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a <= b)),
                    (TokenType::GreaterEqual, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a >= b)),
                    (TokenType::Greater, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a > b)),

                    (
                        TokenType::Minus
                        | TokenType::Star
                        | TokenType::Slash
                        | TokenType::Less
                        | TokenType::LessEqual
                        | TokenType::GreaterEqual
                        | TokenType::Greater,
                        ..,
                    ) => Err(RuntimeErr::OperandsNotNumbers(op.line).into()),

                    (TokenType::EqualEqual, a, b) => Ok(Val::Bool(a == b)),
                    (TokenType::BangEqual, a, b) => Ok(Val::Bool(a != b)),

                    _ => Err(InternalErr::NotBinaryOperator(op.lexeme.clone(), op.line).into()),
                }
            }
        }
    }
}

/// A type error in the evaluated program. Reported to the user, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErr {
    #[error("Operand must be number.")]
    OperandNotNumber(usize),
    #[error("Operands must be numbers.")]
    OperandsNotNumbers(usize),
    #[error("Operands must be two numbers or two strings.")]
    OperandsNotAddable(usize),
}

impl RuntimeErr {
    /// Line of the operator that failed.
    pub fn line(&self) -> usize {
        match self {
            Self::OperandNotNumber(line)
            | Self::OperandsNotNumbers(line)
            | Self::OperandsNotAddable(line) => *line,
        }
    }
}

/// The tree itself is malformed. The parser never builds such a tree, so
/// this is a bug in whoever constructed it rather than in the program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalErr {
    #[error("'{0}' on line {1} is not a unary operator")]
    NotUnaryOperator(Rc<str>, usize),
    #[error("'{0}' on line {1} is not a binary operator")]
    NotBinaryOperator(Rc<str>, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalErr {
    #[error(transparent)]
    Runtime(#[from] RuntimeErr),
    #[error("internal error: {0}")]
    Internal(#[from] InternalErr),
}
