//! Parser state shared by the expression and statement parsers.

use scamp_lexer::token::{Token, TokenKind};
use scamp_types::ast::{Expr, Ident, Program};
use scamp_types::{CompileErrors, ErrorCode, ScampError, SourceFile, Span};

/// Maximum expression nesting depth accepted by the parser.
pub const MAX_NESTING_DEPTH: u32 = 256;

/// Words with a fixed meaning in head position.
pub(crate) const KEYWORDS: &[&str] = &[
    "define", "lambda", "λ", "if", "let", "let*", "cond", "else", "and", "or",
];

pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// The Scamp parser.
///
/// Consumes a token stream produced by the lexer and builds statements
/// and expressions. Collects errors and recovers at the next top-level
/// form.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    pub(crate) pos: usize,
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: CompileErrors,
    /// Current expression nesting depth.
    pub(crate) depth: u32,
}

/// Result of parsing a program.
///
/// `program` is `None` whenever any error was reported.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

/// Result of parsing a single expression.
pub struct ExprParseResult {
    pub expr: Option<Expr>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Current token; `Eof` once the stream is exhausted.
    pub(crate) fn peek(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Consume the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// True when the current token closes a form (or input ended).
    pub(crate) fn at_form_end(&self) -> bool {
        self.peek_kind().is_close() || self.at_end()
    }

    /// Kind of the token `n` places ahead.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect the delimiter closing `open`. `usage` describes the
    /// enclosing form for the error when extra parts are present.
    pub(crate) fn expect_close(&mut self, open: &Token, usage: &str) -> Option<Span> {
        let closer = open.kind.closer()?;
        if self.check_exact(&closer) {
            return Some(self.advance().span);
        }
        if self.at_end() {
            self.error_at(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("'{}' opened at {} is never closed", open.kind, open.span),
                open.span,
            );
        } else if self.peek_kind().is_close() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!(
                    "expected '{closer}' to close '{}' at {}, got '{}'",
                    open.kind,
                    open.span,
                    self.peek_kind()
                ),
            );
        } else {
            self.error_with_usage(
                format!("unexpected '{}' in form", self.peek_kind()),
                self.current_span(),
                usage,
            );
        }
        None
    }

    /// Expect an opening delimiter.
    pub(crate) fn expect_open(&mut self, usage: &str) -> Option<Token> {
        if self.peek_kind().is_open() {
            Some(self.advance())
        } else {
            self.error_with_usage(
                format!("expected '(' or '[', got '{}'", self.peek_kind()),
                self.current_span(),
                usage,
            );
            None
        }
    }

    /// Expect a binder name; keywords are rejected.
    pub(crate) fn expect_identifier(&mut self, usage: &str) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) if !is_keyword(&name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            TokenKind::Identifier(name) => {
                self.error_at_current(
                    ErrorCode::MALFORMED_FORM,
                    format!("'{name}' is a keyword and cannot be used as a name"),
                );
                None
            }
            _ => {
                self.error_with_usage(
                    format!("expected a name, got '{}'", self.peek_kind()),
                    self.current_span(),
                    usage,
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let error = ScampError::new(code, message)
            .with_span(span)
            .with_snippet(self.source_file.snippet(span));
        self.errors.push_error(error);
    }

    /// Report a malformed special form, with its expected shape as hint.
    pub(crate) fn error_with_usage(&mut self, message: impl Into<String>, span: Span, usage: &str) {
        let error = ScampError::new(ErrorCode::MALFORMED_FORM, message)
            .with_span(span)
            .with_snippet(self.source_file.snippet(span))
            .with_hint(format!("expected {usage}"));
        self.errors.push_error(error);
    }

    /// The error cap is reached; stop parsing.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= scamp_types::MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip one balanced datum starting at the cursor. Always consumes at
    /// least one token unless input has ended.
    pub(crate) fn skip_datum(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            let kind = self.advance().kind;
            if kind.is_open() {
                depth += 1;
            } else if kind.is_close() {
                depth = depth.saturating_sub(1);
            }
            if depth == 0 {
                return;
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        let program = (!self.errors.has_errors()).then_some(program);
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    /// Parse the token stream as exactly one expression.
    pub fn parse_expression_only(mut self) -> ExprParseResult {
        let expr = if self.at_end() {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected an expression");
            None
        } else {
            self.parse_expression()
        };
        if expr.is_some() && !self.at_end() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("unexpected '{}' after expression", self.peek_kind()),
            );
        }
        let expr = expr.filter(|_| !self.errors.has_errors());
        ExprParseResult {
            expr,
            errors: self.errors,
        }
    }
}
