use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::token::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanErr {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

fn keywords() -> &'static FxHashMap<&'static str, TokenType> {
    static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenType>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        [
            ("and", TokenType::And),
            ("class", TokenType::Class),
            ("else", TokenType::Else),
            ("false", TokenType::False),
            ("for", TokenType::For),
            ("fun", TokenType::Fun),
            ("if", TokenType::If),
            ("nil", TokenType::Nil),
            ("or", TokenType::Or),
            ("print", TokenType::Print),
            ("return", TokenType::Return),
            ("super", TokenType::Super),
            ("this", TokenType::This),
            ("true", TokenType::True),
            ("var", TokenType::Var),
            ("while", TokenType::While),
        ]
        .into_iter()
        .collect()
    })
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

struct Scanner<'a> {
    str: &'a [char],
    start: usize,
    index: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(str: &'a [char]) -> Self {
        Self {
            str,
            start: 0,
            index: 0,
            line: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.str.get(self.index).copied();
        if c.is_some() {
            self.index += 1;
        }
        c
    }

    // "match" is a keyword in the metalanguage already.
    fn match_next(&mut self, c: char) -> bool {
        let res = self.peek() == Some(c);
        if res {
            self.index += 1;
        }
        res
    }

    fn peek(&self) -> Option<char> {
        self.str.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.str.get(self.index + 1).copied()
    }

    fn text(&self, from: usize, to: usize) -> String {
        self.str[from..to].iter().collect()
    }

    fn lexeme(&self) -> String {
        self.text(self.start, self.index)
    }

    fn token(&self, kind: TokenType) -> Token {
        Token::new(kind, self.lexeme().into(), "".into(), self.line)
    }

    fn either(&mut self, next: char, matched: TokenType, single: TokenType) -> TokenType {
        if self.match_next(next) {
            matched
        } else {
            single
        }
    }

    /// Scans one token starting at `self.start`. `Ok(None)` means the characters
    /// were consumed without producing anything (whitespace, comments).
    fn scan_token(&mut self, c: char) -> Result<Option<Token>, ScanErr> {
        let kind = match c {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            ',' => TokenType::Comma,
            '.' => TokenType::Dot,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            ';' => TokenType::Semicolon,
            '/' => {
                if self.match_next('/') {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.advance();
                    }
                    return Ok(None);
                }
                TokenType::Slash
            }
            '>' => self.either('=', TokenType::GreaterEqual, TokenType::Greater),
            '=' => self.either('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => self.either('=', TokenType::LessEqual, TokenType::Less),
            '!' => self.either('=', TokenType::BangEqual, TokenType::Bang),
            '\n' => {
                self.line += 1;
                return Ok(None);
            }
            '\r' | '\t' | ' ' => return Ok(None),
            '"' => return self.string().map(Some),
            '0'..='9' => return Ok(Some(self.number())),
            c if is_alpha(c) => return Ok(Some(self.identifier())),
            c => return Err(ScanErr::UnexpectedCharacter(c)),
        };

        Ok(Some(self.token(kind)))
    }

    fn string(&mut self) -> Result<Token, ScanErr> {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.peek().is_none() {
            return Err(ScanErr::UnterminatedString);
        }

        // Closing quote.
        self.advance();
        let value = self.text(self.start + 1, self.index - 1);
        Ok(Token::new(
            TokenType::String,
            self.lexeme().into(),
            value.into(),
            self.line,
        ))
    }

    fn number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // A trailing '.' without digits is left for the next token.
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme: std::rc::Rc<str> = self.lexeme().into();
        Token::new(TokenType::Number, lexeme.clone(), lexeme, self.line)
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_some_and(is_alphanumeric) {
            self.advance();
        }

        let text = self.lexeme();
        let kind = keywords()
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);
        Token::new(kind, text.into(), "".into(), self.line)
    }
}

/// Splits `code` into tokens. The result always ends with an EOF token.
///
/// Lexical errors are reported to `diagnostics` and skipped; scanning carries
/// on with the next character.
pub fn scan(code: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let chars = code.chars().collect::<Vec<_>>();
    let mut scanner = Scanner::new(&chars);
    let mut result = vec![];

    loop {
        scanner.start = scanner.index;
        let Some(c) = scanner.advance() else {
            result.push(Token::eof(scanner.line));
            return result;
        };

        match scanner.scan_token(c) {
            Ok(Some(tok)) => result.push(tok),
            Ok(None) => {}
            Err(err) => diagnostics.report(scanner.line, "", err.to_string()),
        }
    }
}
