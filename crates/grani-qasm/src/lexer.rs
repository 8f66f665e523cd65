//! Lexer for OpenQASM 2.

use logos::Logos;

/// Tokens for OpenQASM 2.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("gate")]
    Gate,

    #[token("opaque")]
    Opaque,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    #[token("if")]
    If,

    // Constants
    #[token("pi")]
    Pi,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("==")]
    EqEq,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::OpenQasm => write!(f, "OPENQASM"),
            Token::Include => write!(f, "include"),
            Token::Qreg => write!(f, "qreg"),
            Token::Creg => write!(f, "creg"),
            Token::Gate => write!(f, "gate"),
            Token::Opaque => write!(f, "opaque"),
            Token::Measure => write!(f, "measure"),
            Token::Reset => write!(f, "reset"),
            Token::Barrier => write!(f, "barrier"),
            Token::If => write!(f, "if"),
            Token::Pi => write!(f, "pi"),
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::EqEq => write!(f, "=="),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// A token with its span information.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    #[allow(dead_code)]
    pub span: std::ops::Range<usize>,
}

/// Tokenize a QASM source string.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &source[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}
