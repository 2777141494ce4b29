//! Lexer tests for Scamp.
//!
//! Covers: delimiters, atoms (numbers, strings, characters, booleans,
//! identifiers), comments, block comment rejection, error recovery, and
//! the 100-iteration determinism test.

use scamp_lexer::{Lexer, TokenKind};
use scamp_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.scm", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

/// Lex and return the error codes.
fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.scm", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Delimiters & structure
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_source_is_just_eof() {
    let sf = SourceFile::new("test.scm", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

#[test]
fn test_define_form() {
    assert_eq!(
        kinds("(define x 1)"),
        vec![
            TokenKind::LParen,
            ident("define"),
            ident("x"),
            TokenKind::NumberLit(1.0),
            TokenKind::RParen,
        ]
    );
}

#[test]
fn test_brackets() {
    assert_eq!(
        kinds("[x 1]"),
        vec![
            TokenKind::LBracket,
            ident("x"),
            TokenKind::NumberLit(1.0),
            TokenKind::RBracket,
        ]
    );
}

#[test]
fn test_delimiters_split_atoms() {
    assert_eq!(
        kinds("(f(g)x)"),
        vec![
            TokenKind::LParen,
            ident("f"),
            TokenKind::LParen,
            ident("g"),
            TokenKind::RParen,
            ident("x"),
            TokenKind::RParen,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Atoms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("0 42 -7 +3 2.5 .5 -0.25"),
        vec![
            TokenKind::NumberLit(0.0),
            TokenKind::NumberLit(42.0),
            TokenKind::NumberLit(-7.0),
            TokenKind::NumberLit(3.0),
            TokenKind::NumberLit(2.5),
            TokenKind::NumberLit(0.5),
            TokenKind::NumberLit(-0.25),
        ]
    );
}

#[test]
fn test_operator_identifiers() {
    assert_eq!(
        kinds("+ - * / <= null? string-append λ"),
        vec![
            ident("+"),
            ident("-"),
            ident("*"),
            ident("/"),
            ident("<="),
            ident("null?"),
            ident("string-append"),
            ident("λ"),
        ]
    );
}

#[test]
fn test_sign_followed_by_letters_is_identifier() {
    assert_eq!(kinds("-x +inf"), vec![ident("-x"), ident("+inf")]);
}

#[test]
fn test_booleans() {
    assert_eq!(
        kinds("#t #f #true #false"),
        vec![
            TokenKind::BoolLit(true),
            TokenKind::BoolLit(false),
            TokenKind::BoolLit(true),
            TokenKind::BoolLit(false),
        ]
    );
}

#[test]
fn test_strings_with_escapes() {
    assert_eq!(
        kinds(r#""hello" "a\"b" "tab\there" "line\n" "back\\""#),
        vec![
            TokenKind::StringLit("hello".into()),
            TokenKind::StringLit("a\"b".into()),
            TokenKind::StringLit("tab\there".into()),
            TokenKind::StringLit("line\n".into()),
            TokenKind::StringLit("back\\".into()),
        ]
    );
}

#[test]
fn test_string_may_contain_delimiters() {
    assert_eq!(
        kinds(r#""(a) ; [b]""#),
        vec![TokenKind::StringLit("(a) ; [b]".into())]
    );
}

#[test]
fn test_characters() {
    assert_eq!(
        kinds(r"#\a #\space #\newline #\( #\tab"),
        vec![
            TokenKind::CharLit('a'),
            TokenKind::CharLit(' '),
            TokenKind::CharLit('\n'),
            TokenKind::CharLit('('),
            TokenKind::CharLit('\t'),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comments_are_skipped() {
    assert_eq!(
        kinds("; header\n(f) ; trailing\n; last"),
        vec![TokenKind::LParen, ident("f"), TokenKind::RParen]
    );
}

#[test]
fn test_block_comment_rejected() {
    let sf = SourceFile::new("test.scm", "#| nope |# x");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::BLOCK_COMMENT_USED);
    assert!(err.hint.is_some());
    let rest: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(rest, vec![ident("x"), TokenKind::Eof]);
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unterminated_string() {
    assert_eq!(
        error_codes("(f \"abc"),
        vec![ErrorCode::UNTERMINATED_STRING]
    );
}

#[test]
fn test_bad_escape() {
    assert_eq!(error_codes(r#""a\qb""#), vec![ErrorCode::INVALID_LITERAL]);
}

#[test]
fn test_bad_number() {
    assert_eq!(error_codes("1.2.3 12abc"), vec![
        ErrorCode::INVALID_LITERAL,
        ErrorCode::INVALID_LITERAL
    ]);
}

#[test]
fn test_bad_hash_literal_has_hint() {
    let sf = SourceFile::new("test.scm", "#yes");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors[0].code, ErrorCode::INVALID_LITERAL);
    assert_eq!(
        result.errors.errors[0].hint.as_deref(),
        Some("Booleans are written #t and #f")
    );
}

#[test]
fn test_recovery_continues_after_error() {
    let sf = SourceFile::new("test.scm", "#bad (f 1)");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.tokens.len(), 5);
}

#[test]
fn test_error_cap_stops_lexing() {
    let source = "#x ".repeat(40);
    let sf = SourceFile::new("test.scm", source);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, scamp_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

#[test]
fn test_error_snippet_is_source_line() {
    let sf = SourceFile::new("test.scm", "(f 1)\n(g #nope)");
    let result = Lexer::new(&sf).lex();
    assert_eq!(
        result.errors.errors[0].snippet.as_deref(),
        Some("(g #nope)")
    );
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lexer_determinism_100_iterations() {
    let source = "(define (f x) (if (< x 1) \"small\" #\\b))\n(f 2.5)";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(first, kinds(source), "Determinism failure at iteration {i}");
    }
}
