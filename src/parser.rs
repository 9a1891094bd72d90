use crate::expr::*;
use crate::token::*;

use thiserror::Error;

/// Default bound on nested groupings and unary operators.
pub const MAX_DEPTH: usize = 256;
/// Default bound on the height of the finished tree, which also counts
/// operands chained by binary operators.
pub const MAX_HEIGHT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrType {
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expression nesting too deep.")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{data}")]
pub struct ParseErr {
    pub data: ParseErrType,
    /// The token the parser was looking at when it gave up.
    pub token: Token,
}

impl ParseErr {
    fn new(data: ParseErrType, token: Token) -> Self {
        ParseErr { data, token }
    }

    /// Where the error happened, formatted for a diagnostic.
    pub fn location(&self) -> String {
        if self.token.is_eof() {
            " at end".to_string()
        } else {
            format!(" at '{}'", self.token.lexeme)
        }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

/// A subtree together with its height, so that left-deep operator chains
/// can be bounded without walking the tree.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, height: 1 }
    }
}

type NodeResult = Result<Node, ParseErr>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    depth: usize,
    max_depth: usize,
    max_height: usize,
    // Stands in for a missing EOF token at the end of `tokens`.
    eof: Token,
}

impl<'a> Parser<'a> {
    /// `tokens` normally ends with the EOF token [`crate::scanner::scan`] appends;
    /// running off the end of a slice without one behaves the same.
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        let line = tokens.last().map_or(1, |tok| tok.line);
        Parser {
            tokens,
            index: 0,
            depth: 0,
            max_depth: MAX_DEPTH,
            max_height: MAX_HEIGHT,
            eof: Token::eof(line),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height.max(1);
        self
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.index).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.index - 1]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.index += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenType) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn match_next_lits<const N: usize>(&mut self, ttypes: [TokenType; N]) -> bool {
        let res = ttypes.iter().any(|x| self.check(*x));
        if res {
            self.index += 1;
        }
        res
    }

    fn consume(&mut self, kind: TokenType, err: ParseErrType) -> Result<&Token, ParseErr> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(ParseErr::new(err, self.peek().clone()))
    }

    fn error(&self, err: ParseErrType) -> ParseErr {
        ParseErr::new(err, self.peek().clone())
    }

    /// Discards tokens until the start of what is likely the next statement:
    /// just past a `;`, or right before a statement keyword.
    ///
    /// Expressions have no statement boundaries, so `parse` never calls this.
    /// Statement-level grammars use it to recover after reporting an error.
    pub fn synchronize(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenType::Semicolon {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    /// Index of the next unread token.
    pub fn position(&self) -> usize {
        self.index
    }

    // Parsing the actual grammar.
    pub fn parse(&mut self) -> Result<Expr, ParseErr> {
        self.depth = 0;
        Ok(self.expression()?.expr)
    }

    fn enter(&mut self) -> Result<(), ParseErr> {
        if self.depth >= self.max_depth {
            return Err(self.error(ParseErrType::TooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn join(&self, left: Node, op: Token, right: Node) -> NodeResult {
        let height = left.height.max(right.height) + 1;
        if height > self.max_height {
            return Err(ParseErr::new(ParseErrType::TooDeep, op));
        }
        Ok(Node {
            expr: Expr::binary(left.expr, op, right.expr),
            height,
        })
    }

    fn wrap(&self, inner: Node, make: impl FnOnce(Expr) -> Expr, at: &Token) -> NodeResult {
        let height = inner.height + 1;
        if height > self.max_height {
            return Err(ParseErr::new(ParseErrType::TooDeep, at.clone()));
        }
        Ok(Node {
            expr: make(inner.expr),
            height,
        })
    }

    fn expression(&mut self) -> NodeResult {
        self.equality()
    }

    /// One left-associative precedence level: `operand (op operand)*`.
    fn binary<const N: usize>(
        &mut self,
        ops: [TokenType; N],
        operand: fn(&mut Self) -> NodeResult,
    ) -> NodeResult {
        let mut expr = operand(self)?;

        while self.match_next_lits(ops) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = self.join(expr, op, right)?;
        }

        Ok(expr)
    }

    fn equality(&mut self) -> NodeResult {
        self.binary([TokenType::BangEqual, TokenType::EqualEqual], Self::comparison)
    }

    fn comparison(&mut self) -> NodeResult {
        self.binary(
            [
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> NodeResult {
        self.binary([TokenType::Minus, TokenType::Plus], Self::factor)
    }

    fn factor(&mut self) -> NodeResult {
        self.binary([TokenType::Slash, TokenType::Star], Self::unary)
    }

    fn unary(&mut self) -> NodeResult {
        if self.match_next_lits([TokenType::Bang, TokenType::Minus]) {
            let op = self.previous().clone();
            self.enter()?;
            let operand = self.unary();
            self.leave();
            let operand = operand?;
            self.wrap(operand, |x| Expr::unary(op.clone(), x), &op)
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> NodeResult {
        if self.match_next_lits([TokenType::False]) {
            return Ok(Node::leaf(Expr::literal(FALSE_LITERAL)));
        }
        if self.match_next_lits([TokenType::True]) {
            return Ok(Node::leaf(Expr::literal(TRUE_LITERAL)));
        }
        if self.match_next_lits([TokenType::Nil]) {
            return Ok(Node::leaf(Expr::literal(NIL_LITERAL)));
        }
        if self.match_next_lits([TokenType::Number, TokenType::String]) {
            return Ok(Node::leaf(Expr::Literal(self.previous().literal.clone())));
        }
        if self.match_next_lits([TokenType::LeftParen]) {
            let paren = self.previous().clone();
            self.enter()?;
            let inner = self.expression();
            self.leave();
            let inner = inner?;
            self.consume(TokenType::RightParen, ParseErrType::ExpectedRightParen)?;
            return self.wrap(inner, Expr::grouping, &paren);
        }

        Err(self.error(ParseErrType::ExpectedExpression))
    }
}
