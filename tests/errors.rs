use zibrai::diagnostics::Phase;
use zibrai::expr::{EvalErr, Expr, InternalErr, RuntimeErr};
use std::io::{self, Write};

use zibrai::interpreter::{InterpretErr, Interpreter};
use zibrai::token::{Token, TokenType};

fn diagnostics_of(code: &str) -> (Interpreter<Vec<u8>>, Vec<String>) {
    let mut interp = Interpreter::with_output(Vec::new());
    assert_eq!(interp.run(code).unwrap(), None);
    let rendered = interp
        .diagnostics()
        .records()
        .iter()
        .map(ToString::to_string)
        .collect();
    (interp, rendered)
}

#[test]
fn adding_mixed_operands() {
    let (interp, rendered) = diagnostics_of("1 + \"b\"");
    assert_eq!(
        rendered,
        ["Operands must be two numbers or two strings.\n[line 1]"]
    );
    assert!(interp.diagnostics().had_runtime_error());
    assert!(!interp.diagnostics().had_error());
    assert!(interp.output().is_empty());
}

#[test]
fn arithmetic_needs_numbers() {
    for code in ["\"a\" - \"b\"", "true * 2", "\"x\" / 1", "1 < \"b\"", "false >= true"] {
        let (_, rendered) = diagnostics_of(code);
        assert_eq!(rendered, ["Operands must be numbers.\n[line 1]"], "{code}");
    }
}

#[test]
fn negation_needs_a_number() {
    let (_, rendered) = diagnostics_of("-\"abc\"");
    assert_eq!(rendered, ["Operand must be number.\n[line 1]"]);
}

#[test]
fn runtime_error_points_at_operator_line() {
    let (_, rendered) = diagnostics_of("1 +\n2 -\n\"x\"");
    assert_eq!(rendered, ["Operands must be numbers.\n[line 2]"]);
}

#[test]
fn runtime_error_aborts_whole_expression() {
    let (interp, _) = diagnostics_of("(1 + true) == 2");
    assert_eq!(interp.diagnostics().records().len(), 1);
    assert!(interp.output().is_empty());
}

#[test]
fn parse_errors() {
    let (interp, rendered) = diagnostics_of("(1 + 2");
    assert_eq!(rendered, ["[line 1] Error at end: Expect ')' after expression."]);
    assert!(interp.diagnostics().had_error());
    assert!(!interp.diagnostics().had_runtime_error());

    let (_, rendered) = diagnostics_of("1 * * 2");
    assert_eq!(rendered, ["[line 1] Error at '*': Expect expression."]);
}

#[test]
fn lex_errors_block_evaluation() {
    let (interp, rendered) = diagnostics_of("1 + @2");
    assert_eq!(rendered, ["[line 1] Error: Unexpected character."]);
    assert!(interp.diagnostics().records()[0].phase == Phase::Syntax);
    assert!(interp.output().is_empty());
}

#[test]
fn unterminated_string_then_parse_error() {
    let (_, rendered) = diagnostics_of("1 +\n\"abc");
    assert_eq!(
        rendered,
        [
            "[line 2] Error: Unterminated string.",
            "[line 2] Error at end: Expect expression.",
        ]
    );
}

#[test]
fn malformed_tree_is_internal() {
    let comma = Token::new(TokenType::Comma, ",".into(), "".into(), 4);
    let expr = Expr::binary(Expr::literal("1"), comma, Expr::literal("2"));

    assert_eq!(
        expr.eval(),
        Err(EvalErr::Internal(InternalErr::NotBinaryOperator(",".into(), 4)))
    );

    let mut interp = Interpreter::with_output(Vec::new());
    assert!(matches!(
        interp.interpret(&expr),
        Err(InterpretErr::Internal(InternalErr::NotBinaryOperator(_, 4)))
    ));
    // Never mistaken for a runtime error.
    assert!(!interp.diagnostics().had_runtime_error());
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_output_is_reported() {
    let mut interp = Interpreter::with_output(ClosedPipe);
    match interp.run("1 + 1") {
        Err(InterpretErr::Output(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected an output error, got {other:?}"),
    }
    assert!(!interp.diagnostics().had_runtime_error());
}

#[test]
fn runtime_error_values() {
    let plus = Token::new(TokenType::Plus, "+".into(), "".into(), 9);
    let expr = Expr::binary(Expr::literal("1"), plus, Expr::literal("x"));

    let err = expr.eval().unwrap_err();
    assert_eq!(err, EvalErr::Runtime(RuntimeErr::OperandsNotAddable(9)));
    assert_eq!(
        err.to_string(),
        "Operands must be two numbers or two strings."
    );
}

#[test]
fn error_flags_persist_until_reset() {
    let mut interp = Interpreter::with_output(Vec::new());
    interp.run("1 +").unwrap();
    interp.run("1 + 1").unwrap();
    assert!(interp.diagnostics().had_error());

    interp.diagnostics_mut().reset();
    assert!(!interp.diagnostics().had_error());
}
