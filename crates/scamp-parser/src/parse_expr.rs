//! Expression parsing.
//!
//! Every expression is either an atom or a parenthesized form. Forms whose
//! head is a keyword (`lambda`, `if`, `let`, `let*`, `cond`, `and`, `or`)
//! have fixed shapes; any other form is an application. `(` and `[` are
//! interchangeable as long as each is closed by its own partner.

use scamp_lexer::token::TokenKind;
use scamp_types::ast::*;
use scamp_types::ErrorCode;

use crate::parser::{is_keyword, Parser, MAX_NESTING_DEPTH};

const LAMBDA_USAGE: &str = "(lambda (param ...) body)";
const IF_USAGE: &str = "(if test then else)";
const LET_USAGE: &str = "(let ([name expr] ...) body)";
const COND_USAGE: &str = "(cond [guard body] ...)";
const CALL_USAGE: &str = "(function arg ...)";

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {MAX_NESTING_DEPTH}"),
            );
            self.depth -= 1;
            return None;
        }
        let result = self.parse_datum();
        self.depth -= 1;
        result
    }

    fn parse_datum(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::NumberLit(n) => ExprKind::Lit(Lit::Number(n)),
            TokenKind::StringLit(s) => ExprKind::Lit(Lit::Str(s)),
            TokenKind::CharLit(c) => ExprKind::Lit(Lit::Char(c)),
            TokenKind::BoolLit(b) => ExprKind::Lit(Lit::Bool(b)),
            TokenKind::Identifier(name) if name == "null" => ExprKind::Nil,
            TokenKind::Identifier(name) if is_keyword(&name) => {
                self.error_at_current(
                    ErrorCode::MALFORMED_FORM,
                    format!("'{name}' is a keyword and cannot be used as an expression"),
                );
                return None;
            }
            TokenKind::Identifier(name) => ExprKind::Var(name),
            TokenKind::LParen | TokenKind::LBracket => return self.parse_form(),
            TokenKind::RParen | TokenKind::RBracket => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("unexpected '{}'", token.kind),
                );
                return None;
            }
            TokenKind::Eof => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "unexpected end of input, expected an expression",
                );
                return None;
            }
        };
        self.advance();
        Some(Expr::new(kind, token.span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Forms
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_form(&mut self) -> Option<Expr> {
        let open = self.advance();
        if self.peek_kind().is_close() {
            let span = open.span.merge(self.current_span());
            self.error_with_usage("empty form '()'", span, CALL_USAGE);
            return None;
        }

        let head = match self.peek_kind() {
            TokenKind::Identifier(name) => name.clone(),
            _ => String::new(),
        };
        let (kind, usage) = match head.as_str() {
            "lambda" | "λ" => {
                self.advance();
                (self.parse_lambda()?, LAMBDA_USAGE)
            }
            "if" => {
                self.advance();
                (self.parse_if()?, IF_USAGE)
            }
            "let" | "let*" => {
                self.advance();
                (self.parse_let()?, LET_USAGE)
            }
            "cond" => {
                self.advance();
                (ExprKind::Cond(self.parse_cond_branches()?), COND_USAGE)
            }
            "and" => {
                self.advance();
                (ExprKind::And(self.parse_exprs_until_close()?), "(and expr ...)")
            }
            "or" => {
                self.advance();
                (ExprKind::Or(self.parse_exprs_until_close()?), "(or expr ...)")
            }
            "define" => {
                self.error_at_current(
                    ErrorCode::DEFINE_NOT_AT_TOP_LEVEL,
                    "'define' is only allowed at the top level of a program",
                );
                return None;
            }
            _ => (self.parse_application()?, CALL_USAGE),
        };

        let end = self.expect_close(&open, usage)?;
        Some(Expr::new(kind, open.span.merge(end)))
    }

    /// `(head arg ...)` after the opening delimiter.
    fn parse_application(&mut self) -> Option<ExprKind> {
        let head = self.parse_expression()?;
        let args = self.parse_exprs_until_close()?;
        Some(ExprKind::Call {
            head: Box::new(head),
            args,
        })
    }

    /// `(params...) body` after `lambda`.
    fn parse_lambda(&mut self) -> Option<ExprKind> {
        let params = self.parse_param_list(LAMBDA_USAGE)?;
        let body = self.parse_form_part(LAMBDA_USAGE)?;
        Some(ExprKind::Lambda {
            params,
            body: Box::new(body),
        })
    }

    /// `(name ...)`, consuming both delimiters.
    fn parse_param_list(&mut self, usage: &str) -> Option<Vec<Ident>> {
        let open = self.expect_open(usage)?;
        let mut params = Vec::new();
        while !self.at_form_end() {
            params.push(self.expect_identifier(usage)?);
        }
        self.expect_close(&open, usage)?;
        Some(params)
    }

    /// `test then else` after `if`.
    fn parse_if(&mut self) -> Option<ExprKind> {
        let test = self.parse_form_part(IF_USAGE)?;
        let then_branch = self.parse_form_part(IF_USAGE)?;
        let else_branch = self.parse_form_part(IF_USAGE)?;
        Some(ExprKind::If {
            test: Box::new(test),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `([name expr] ...) body` after `let` or `let*`.
    ///
    /// Both spellings are sequential: each binding sees the ones before it.
    fn parse_let(&mut self) -> Option<ExprKind> {
        let list_open = self.expect_open(LET_USAGE)?;
        let mut bindings = Vec::new();
        while !self.at_form_end() {
            let open = self.expect_open(LET_USAGE)?;
            let name = self.expect_identifier(LET_USAGE)?;
            let value = self.parse_form_part(LET_USAGE)?;
            self.expect_close(&open, LET_USAGE)?;
            bindings.push(Binding { name, value });
        }
        self.expect_close(&list_open, LET_USAGE)?;
        let body = self.parse_form_part(LET_USAGE)?;
        Some(ExprKind::Let {
            bindings,
            body: Box::new(body),
        })
    }

    /// `[guard body] ...` after `cond`. An `else` guard becomes `#t`.
    fn parse_cond_branches(&mut self) -> Option<Vec<CondBranch>> {
        let mut branches = Vec::new();
        while !self.at_form_end() {
            let open = self.expect_open(COND_USAGE)?;
            let guard = match self.peek_kind() {
                TokenKind::Identifier(name) if name == "else" => {
                    let span = self.advance().span;
                    Expr::new(ExprKind::Lit(Lit::Bool(true)), span)
                }
                _ => self.parse_form_part(COND_USAGE)?,
            };
            let body = self.parse_form_part(COND_USAGE)?;
            self.expect_close(&open, COND_USAGE)?;
            branches.push(CondBranch { guard, body });
        }
        Some(branches)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Helpers
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse expressions until the enclosing form closes.
    fn parse_exprs_until_close(&mut self) -> Option<Vec<Expr>> {
        let mut exprs = Vec::new();
        while !self.at_form_end() {
            exprs.push(self.parse_expression()?);
        }
        Some(exprs)
    }

    /// Parse a required part of a special form.
    pub(crate) fn parse_form_part(&mut self, usage: &str) -> Option<Expr> {
        if self.at_form_end() {
            let span = self.current_span();
            self.error_with_usage("form is missing a part", span, usage);
            return None;
        }
        self.parse_expression()
    }
}
