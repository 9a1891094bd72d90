use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scanning or parsing.
    Syntax,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: usize,
    /// Where on the line the problem is, e.g. ` at ')'`. Empty for scanner errors.
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Syntax => write!(
                f,
                "[line {}] Error{}: {}",
                self.line, self.location, self.message
            ),
            Phase::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
        }
    }
}

/// Collects everything the front end complains about during one session.
///
/// Replaces a pair of process-wide flags: each [`crate::interpreter::Interpreter`]
/// owns its own sink, so independent runs never see each other's errors.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn report(&mut self, line: usize, location: impl Into<String>, message: impl Into<String>) {
        self.records.push(Diagnostic {
            phase: Phase::Syntax,
            line,
            location: location.into(),
            message: message.into(),
        });
        self.had_error = true;
    }

    pub fn report_runtime(&mut self, message: impl Into<String>, line: usize) {
        self.records.push(Diagnostic {
            phase: Phase::Runtime,
            line,
            location: String::new(),
            message: message.into(),
        });
        self.had_runtime_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clears the lex/parse flag between interactive inputs.
    pub fn reset(&mut self) {
        self.had_error = false;
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Hands over everything recorded so far. Flags are left untouched.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }
}
