//! Core Scamp lexer. Converts source text to a token stream.
//!
//! Features:
//! - `(`/`)` and `[`/`]` delimiters
//! - Numbers, strings (with `\" \\ \n \t` escapes), characters, booleans
//! - Line comments from `;` to end of line
//! - Block comments (`#| |#`) rejected with E107
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use scamp_types::{CompileErrors, ErrorCode, ScampError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Scamp lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`scamp_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text.
    source: &'src str,
    source_file: &'src SourceFile,
    /// Byte offset of the next character.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in chars).
    col: u32,
    /// Collected errors.
    errors: CompileErrors,
}

/// Tokens plus every error the lexer hit.
pub struct LexResult {
    /// Ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '[' | ']' | '"' | ';')
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: &source_file.source,
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.total_errors >= scamp_types::MAX_ERRORS {
                tokens.push(Token::new(TokenKind::Eof, self.current_span()));
                break;
            }
            let Some(token) = self.scan_token() else {
                continue;
            };
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ── Characters ──

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let err = ScampError::new(code, message)
            .with_span(span)
            .with_snippet(self.source_file.snippet(span));
        self.errors.push_error(err);
    }

    /// Consume the rest of an atom (up to the next delimiter).
    fn take_atom_tail(&mut self) -> &'src str {
        let source = self.source;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            self.advance();
        }
        &source[start..self.pos]
    }

    // ── Whitespace & comments ──

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Consume a `#| ... |#` block and report it.
    fn reject_block_comment(&mut self, start_line: u32, start_col: u32) {
        self.advance(); // '|'
        loop {
            match self.advance() {
                None => break,
                Some('|') if self.peek() == Some('#') => {
                    self.advance();
                    break;
                }
                Some(_) => {}
            }
        }
        let span = self.span_from(start_line, start_col);
        let err = ScampError::new(
            ErrorCode::BLOCK_COMMENT_USED,
            "Block comments are not supported",
        )
        .with_span(span)
        .with_snippet(self.source_file.snippet(span))
        .with_hint("Start each comment line with ';' instead");
        self.errors.push_error(err);
    }

    // ── Scanning ──

    /// Scan one token. `None` means the lexeme was malformed and has
    /// already been reported.
    fn scan_token(&mut self) -> Option<Token> {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.advance() else {
            return Some(Token::new(TokenKind::Eof, self.current_span()));
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '"' => TokenKind::StringLit(self.scan_string(start_line, start_col)?),
            '#' => self.scan_hash(start_line, start_col)?,
            _ => {
                let source = self.source;
                let start = self.pos - ch.len_utf8();
                self.take_atom_tail();
                let text = &source[start..self.pos];
                self.classify_atom(text, start_line, start_col)?
            }
        };
        Some(Token::new(kind, self.span_from(start_line, start_col)))
    }

    /// Numbers start with a digit, or a sign/dot followed by a digit.
    fn classify_atom(&mut self, text: &str, start_line: u32, start_col: u32) -> Option<TokenKind> {
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
        let looks_numeric = unsigned
            .strip_prefix('.')
            .unwrap_or(unsigned)
            .starts_with(|c: char| c.is_ascii_digit());
        if !looks_numeric {
            return Some(TokenKind::Identifier(text.to_string()));
        }
        let well_formed = unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
            && unsigned.matches('.').count() <= 1;
        match text.parse::<f64>() {
            Ok(n) if well_formed => Some(TokenKind::NumberLit(n)),
            _ => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_LITERAL,
                    format!("Invalid number literal '{text}'"),
                    span,
                );
                None
            }
        }
    }

    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Option<String> {
        let mut value = String::new();
        let mut ok = true;
        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    return None;
                }
                Some('"') => break,
                Some('\\') => {
                    let esc_line = self.line;
                    let esc_col = self.col - 1;
                    match self.advance() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        other => {
                            ok = false;
                            let shown = other.map(String::from).unwrap_or_default();
                            let span = self.span_from(esc_line, esc_col);
                            self.emit_error(
                                ErrorCode::INVALID_LITERAL,
                                format!("Unknown escape sequence '\\{shown}'"),
                                span,
                            );
                        }
                    }
                }
                Some(c) => value.push(c),
            }
        }
        ok.then_some(value)
    }

    /// `#t`, `#f`, `#true`, `#false`, `#\c`, and the rejected `#|`.
    fn scan_hash(&mut self, start_line: u32, start_col: u32) -> Option<TokenKind> {
        match self.peek() {
            Some('|') => {
                self.reject_block_comment(start_line, start_col);
                None
            }
            Some('\\') => {
                self.advance();
                let Some(first) = self.advance() else {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(ErrorCode::INVALID_LITERAL, "Empty character literal", span);
                    return None;
                };
                let rest = self.take_atom_tail();
                if rest.is_empty() {
                    return Some(TokenKind::CharLit(first));
                }
                let name = format!("{first}{rest}");
                match name.as_str() {
                    "space" => Some(TokenKind::CharLit(' ')),
                    "newline" => Some(TokenKind::CharLit('\n')),
                    "tab" => Some(TokenKind::CharLit('\t')),
                    _ => {
                        let span = self.span_from(start_line, start_col);
                        self.emit_error(
                            ErrorCode::INVALID_LITERAL,
                            format!("Unknown character name '#\\{name}'"),
                            span,
                        );
                        None
                    }
                }
            }
            _ => {
                let text = self.take_atom_tail();
                match text {
                    "t" | "true" => Some(TokenKind::BoolLit(true)),
                    "f" | "false" => Some(TokenKind::BoolLit(false)),
                    _ => {
                        let span = self.span_from(start_line, start_col);
                        let err = ScampError::new(
                            ErrorCode::INVALID_LITERAL,
                            format!("Unknown literal '#{text}'"),
                        )
                        .with_span(span)
                        .with_snippet(self.source_file.snippet(span))
                        .with_hint("Booleans are written #t and #f");
                        self.errors.push_error(err);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> LexResult {
        let sf = SourceFile::new("test.scm", src);
        Lexer::new(&sf).lex()
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let result = lex("(f\n  x)");
        let spans: Vec<Span> = result.tokens.iter().map(|t| t.span).collect();
        assert_eq!(spans[0], Span::new(1, 1, 1, 1));
        assert_eq!(spans[1], Span::new(1, 2, 1, 2));
        assert_eq!(spans[2], Span::new(2, 3, 2, 3));
        assert_eq!(spans[3], Span::new(2, 4, 2, 4));
    }

    #[test]
    fn test_multichar_span() {
        let result = lex("  lambda");
        assert_eq!(result.tokens[0].span, Span::new(1, 3, 1, 8));
    }
}
