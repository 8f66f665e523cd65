//! Parser for OpenQASM 2.

mod expression;
mod lowering;
mod statement;

use grani_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, SpannedToken, Token};

/// Parse a QASM source string into a Circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    lowering::lower_to_circuit(&program)
}

/// Parse a QASM source string into an AST program.
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Parser state.
pub(super) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let token_results = tokenize(source);
        let mut tokens = Vec::new();

        for result in token_results {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, msg)) => {
                    return Err(ParseError::LexerError {
                        position: span.start,
                        message: msg,
                    });
                }
            }
        }

        Ok(Self { tokens, pos: 0 })
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        let version = if self.consume(&Token::OpenQasm) {
            let version = self.parse_version()?;
            self.expect(Token::Semicolon)?;
            Some(version)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            if let Some(statement) = self.parse_statement()? {
                statements.push(statement);
            }
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse version number.
    fn parse_version(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) => Ok(format!("{v}")),
            Some(Token::IntLiteral(v)) => Ok(format!("{v}.0")),
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "version number".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("version number".into())),
        }
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}
