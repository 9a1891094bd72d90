mod cli;

use std::{
    error::Error,
    fs,
    io::{self, stdin, IsTerminal},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser as _;
use rustyline::error::ReadlineError;
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Completer, Editor, Helper, Highlighter, Hinter, Validator};

use zibrai::interpreter::{InterpretErr, Interpreter};
use zibrai::parser::{MAX_DEPTH, MAX_HEIGHT};
use zibrai::printer::print;
use zibrai::scanner::scan;

// sysexits.h
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

/// Evaluates expressions of a small Lox-like language.
#[derive(clap::Parser)]
#[command(name = "zibrai")]
struct Args {
    /// Source file to run; starts an interactive prompt when omitted
    file: Option<PathBuf>,
    /// Print the parenthesized syntax tree instead of evaluating
    #[arg(long, default_value_t = false, conflicts_with = "tokens")]
    print_ast: bool,
    /// Print the scanned tokens instead of evaluating
    #[arg(long, default_value_t = false)]
    tokens: bool,
    /// Deepest expression nesting the parser accepts
    #[arg(long, default_value_t = MAX_DEPTH)]
    max_depth: usize,
    /// Tallest syntax tree the parser accepts, counting operator chains
    #[arg(long, default_value_t = MAX_HEIGHT)]
    max_height: usize,
}

#[derive(Clone, Copy)]
enum Mode {
    Tokens,
    PrintAst,
    Evaluate,
}

impl From<&Args> for Mode {
    fn from(args: &Args) -> Self {
        if args.tokens {
            Mode::Tokens
        } else if args.print_ast {
            Mode::PrintAst
        } else {
            Mode::Evaluate
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mode = Mode::from(&args);
    let mut interpreter = Interpreter::new()
        .with_max_depth(args.max_depth)
        .with_max_height(args.max_height);

    if let Some(path) = &args.file {
        run_file(path, mode, &mut interpreter)
    } else {
        match run_prompt(mode, &mut interpreter) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        }
    }
}

fn run_file(path: &Path, mode: Mode, interpreter: &mut Interpreter) -> ExitCode {
    match fs::read_to_string(path) {
        Ok(content) => run_batch(&content, mode, interpreter),
        Err(err) => {
            eprintln!("error: cannot read {}: {}", path.display(), err);
            ExitCode::from(EX_IOERR)
        }
    }
}

/// Runs a whole program once and turns the diagnostics into an exit status.
fn run_batch(code: &str, mode: Mode, interpreter: &mut Interpreter) -> ExitCode {
    if let Err(err) = run(code, mode, interpreter) {
        return fatal(&err);
    }

    if interpreter.diagnostics().had_error() {
        ExitCode::from(EX_DATAERR)
    } else if interpreter.diagnostics().had_runtime_error() {
        ExitCode::from(EX_SOFTWARE)
    } else {
        ExitCode::SUCCESS
    }
}

fn fatal(err: &InterpretErr) -> ExitCode {
    cli::print_fatal_error(&err.to_string());
    match err {
        InterpretErr::Internal(_) => ExitCode::from(EX_SOFTWARE),
        InterpretErr::Output(_) => ExitCode::from(EX_IOERR),
    }
}

fn run(code: &str, mode: Mode, interpreter: &mut Interpreter) -> Result<(), InterpretErr> {
    let result = match mode {
        Mode::Tokens => {
            for token in scan(code, interpreter.diagnostics_mut()) {
                println!("{}", token);
            }
            Ok(())
        }
        Mode::PrintAst => {
            if let Some(expr) = interpreter.parse_source(code) {
                println!("{}", print(&expr));
            }
            Ok(())
        }
        Mode::Evaluate => interpreter.run(code).map(|_| ()),
    };

    for diagnostic in interpreter.diagnostics_mut().drain() {
        cli::print_diagnostic(&diagnostic);
    }
    result
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
struct ReplHelper {
    #[rustyline(Completer)]
    completer: (),
    #[rustyline(Validator)]
    validator: MatchingBracketValidator,
}

fn run_prompt(mode: Mode, interpreter: &mut Interpreter) -> Result<ExitCode, Box<dyn Error>> {
    if !stdin().is_terminal() {
        let program = io::read_to_string(stdin().lock())?;
        return Ok(run_batch(&program, mode, interpreter));
    }

    let h = ReplHelper {
        completer: (),
        validator: MatchingBracketValidator::new(),
    };
    let mut rl = Editor::new()?;
    rl.set_helper(Some(h));

    loop {
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => {
                if line.trim() == "quit" {
                    return Ok(ExitCode::SUCCESS);
                }
                let _ = rl.add_history_entry(line.as_str());
                if let Err(err) = run(&line, mode, interpreter) {
                    return Ok(fatal(&err));
                }
                interpreter.diagnostics_mut().reset();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Ok(ExitCode::SUCCESS)
            }
            Err(err) => break Err(err.into()),
        }
    }
}
