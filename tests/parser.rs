use zibrai::diagnostics::Diagnostics;
use zibrai::expr::Expr;
use zibrai::parser::{ParseErr, ParseErrType, Parser};
use zibrai::printer::print;
use zibrai::scanner::scan;
use zibrai::token::TokenType;

fn parse(code: &str) -> Result<Expr, ParseErr> {
    let tokens = scan(code, &mut Diagnostics::new());
    Parser::new(&tokens).parse()
}

fn printed(code: &str) -> String {
    print(&parse(code).unwrap())
}

#[test]
fn precedence() {
    assert_eq!(printed("1+2*3"), "(+ 1 (* 2 3))");
    assert_eq!(printed("1*2+3"), "(+ (* 1 2) 3)");
    assert_eq!(printed("1 < 2 == 3 >= 4"), "(== (< 1 2) (>= 3 4))");
    assert_eq!(printed("-1 * !2"), "(* (- 1) (! 2))");
}

#[test]
fn left_associative() {
    assert_eq!(printed("1-2-3"), "(- (- 1 2) 3)");
    assert_eq!(printed("8/4/2"), "(/ (/ 8 4) 2)");
    assert_eq!(printed("1 != 2 == 3"), "(== (!= 1 2) 3)");
}

#[test]
fn grouping() {
    assert_eq!(printed("(1+2)*3"), "(* (group (+ 1 2)) 3)");
    assert_eq!(printed("((1))"), "(group (group 1))");
    assert_eq!(printed("--1"), "(- (- 1))");
}

#[test]
fn literals() {
    assert_eq!(printed("\"hi there\""), "hi there");
    assert_eq!(printed("nil"), "nil");
    assert_eq!(printed("true == false"), "(== true false)");
    assert_eq!(printed("2.50"), "2.50");
}

#[test]
fn missing_paren() {
    let err = parse("(1 + 2").unwrap_err();
    assert_eq!(err.data, ParseErrType::ExpectedRightParen);
    assert_eq!(err.to_string(), "Expect ')' after expression.");
    assert_eq!(err.location(), " at end");
}

#[test]
fn missing_expression() {
    let err = parse("1 + )").unwrap_err();
    assert_eq!(err.data, ParseErrType::ExpectedExpression);
    assert_eq!(err.to_string(), "Expect expression.");
    assert_eq!(err.location(), " at ')'");

    let err = parse("").unwrap_err();
    assert_eq!(err.data, ParseErrType::ExpectedExpression);
    assert!(err.token.is_eof());
}

#[test]
fn identifiers_are_not_expressions() {
    let err = parse("foo").unwrap_err();
    assert_eq!(err.data, ParseErrType::ExpectedExpression);
    assert_eq!(err.location(), " at 'foo'");
}

#[test]
fn trailing_tokens_are_ignored() {
    assert_eq!(printed("1 2"), "1");
}

#[test]
fn nesting_is_bounded() {
    let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    let tokens = scan(&deep, &mut Diagnostics::new());
    assert!(Parser::new(&tokens).parse().is_ok());

    let err = Parser::new(&tokens).with_max_depth(50).parse().unwrap_err();
    assert_eq!(err.data, ParseErrType::TooDeep);

    let negations = format!("{}1", "-".repeat(10_000));
    assert_eq!(parse(&negations).unwrap_err().data, ParseErrType::TooDeep);
}

#[test]
fn operator_chains_are_bounded() {
    let chain = vec!["1"; 5_000].join(" + ");
    let err = parse(&chain).unwrap_err();
    assert_eq!(err.data, ParseErrType::TooDeep);
    assert_eq!(err.token.kind, TokenType::Plus);

    let chain = vec!["1"; 300].join(" + ");
    assert!(parse(&chain).is_ok());

    let tokens = scan(&chain, &mut Diagnostics::new());
    let err = Parser::new(&tokens).with_max_height(100).parse().unwrap_err();
    assert_eq!(err.data, ParseErrType::TooDeep);
}

#[test]
fn height_and_depth_are_separate() {
    let chain = vec!["1"; 300].join(" * ");
    let tokens = scan(&chain, &mut Diagnostics::new());
    assert!(Parser::new(&tokens).with_max_depth(10).parse().is_ok());

    let deep = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let tokens = scan(&deep, &mut Diagnostics::new());
    assert!(Parser::new(&tokens).with_max_height(1000).with_max_depth(10).parse().is_err());
}

#[test]
fn synchronize_stops_at_statement_boundaries() {
    let tokens = scan("1 + ; print 2", &mut Diagnostics::new());
    let mut parser = Parser::new(&tokens);
    parser.synchronize();
    // Just past the `;`.
    assert_eq!(tokens[parser.position()].kind, TokenType::Print);

    let tokens = scan("a b c var x", &mut Diagnostics::new());
    let mut parser = Parser::new(&tokens);
    parser.synchronize();
    assert_eq!(tokens[parser.position()].kind, TokenType::Var);

    let tokens = scan("a b", &mut Diagnostics::new());
    let mut parser = Parser::new(&tokens);
    parser.synchronize();
    assert_eq!(tokens[parser.position()].kind, TokenType::Eof);
}
