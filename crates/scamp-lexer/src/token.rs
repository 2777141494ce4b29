//! Token types for the Scamp lexer.
//!
//! S-expressions need very few token kinds: delimiters, atoms, and `Eof`.
//! Keywords such as `define` or `lambda` are ordinary identifiers here;
//! the parser gives them meaning by position.

use scamp_types::{format_number, Span};
use std::fmt;

/// A single token produced by the Scamp lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in Scamp.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Delimiters ────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // ── Atoms ─────────────────────────────────────────────────
    /// `42`, `-3.5`
    NumberLit(f64),
    /// `"hello"` with escapes already decoded
    StringLit(String),
    /// `#\a`, `#\space`
    CharLit(char),
    /// `#t`, `#f`, `#true`, `#false`
    BoolLit(bool),
    /// Any other delimiter-free run: `x`, `+`, `null?`, `string-append`
    Identifier(String),

    /// End of input.
    Eof,
}

impl TokenKind {
    /// True for `(` and `[`.
    pub fn is_open(&self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket)
    }

    /// True for `)` and `]`.
    pub fn is_close(&self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket)
    }

    /// The closing delimiter that matches an opening one.
    pub fn closer(&self) -> Option<TokenKind> {
        match self {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::NumberLit(n) => write!(f, "{}", format_number(*n)),
            TokenKind::StringLit(s) => write!(f, "{s:?}"),
            TokenKind::CharLit(c) => write!(f, "#\\{c}"),
            TokenKind::BoolLit(true) => write!(f, "#t"),
            TokenKind::BoolLit(false) => write!(f, "#f"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
