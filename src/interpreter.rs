use crate::diagnostics::{Diagnostics, Phase};
use crate::expr::{EvalErr, Expr, InternalErr, Val};
use crate::parser::{Parser, MAX_DEPTH, MAX_HEIGHT};
use crate::scanner::scan;
use std::io::{self, Stdout, Write};
use thiserror::Error;

/// Failures that end a run instead of being reported as diagnostics.
#[derive(Debug, Error)]
pub enum InterpretErr {
    #[error(transparent)]
    Internal(#[from] InternalErr),
    #[error("cannot write result: {0}")]
    Output(#[from] io::Error),
}

/// Runs source text through the whole front end and prints what it evaluates to.
pub struct Interpreter<W: Write = Stdout> {
    out: W,
    diagnostics: Diagnostics,
    max_depth: usize,
    max_height: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_output(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Interpreter {
            out,
            diagnostics: Diagnostics::new(),
            max_depth: MAX_DEPTH,
            max_height: MAX_HEIGHT,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    /// Scans, parses and, if neither step complained, interprets `code`.
    ///
    /// Returns the value of the expression when evaluation succeeded. Every
    /// user-facing problem ends up in [`Self::diagnostics`]; only a malformed
    /// tree or a failing output comes back as an error.
    pub fn run(&mut self, code: &str) -> Result<Option<Val>, InterpretErr> {
        match self.parse_source(code) {
            Some(expr) => self.interpret(&expr),
            None => Ok(None),
        }
    }

    /// Scans and parses `code`, reporting any lex or parse error.
    ///
    /// Returns `None` if there was one, even when the parser managed to
    /// build a tree from the tokens that did scan.
    pub fn parse_source(&mut self, code: &str) -> Option<Expr> {
        let reported = self.diagnostics.records().len();

        let tokens = scan(code, &mut self.diagnostics);
        let parsed = Parser::new(&tokens)
            .with_max_depth(self.max_depth)
            .with_max_height(self.max_height)
            .parse();
        let expr = match parsed {
            Ok(expr) => expr,
            Err(err) => {
                self.diagnostics
                    .report(err.line(), err.location(), err.to_string());
                return None;
            }
        };

        let scan_failed = self.diagnostics.records()[reported..]
            .iter()
            .any(|diag| diag.phase == Phase::Syntax);
        if scan_failed {
            None
        } else {
            Some(expr)
        }
    }

    /// Evaluates `expr` and writes its value to the output.
    ///
    /// Runtime errors are reported and swallowed.
    pub fn interpret(&mut self, expr: &Expr) -> Result<Option<Val>, InterpretErr> {
        match expr.eval() {
            Ok(val) => {
                writeln!(self.out, "{}", val)?;
                Ok(Some(val))
            }
            Err(EvalErr::Runtime(err)) => {
                self.diagnostics.report_runtime(err.to_string(), err.line());
                Ok(None)
            }
            Err(EvalErr::Internal(err)) => Err(err.into()),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
