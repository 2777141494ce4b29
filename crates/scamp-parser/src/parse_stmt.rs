//! Top-level statement parsing.

use crate::parser::Parser;
use scamp_lexer::token::TokenKind;
use scamp_types::ast::*;

const DEFINE_USAGE: &str = "(define name expr) or (define (name param ...) body)";

impl<'src> Parser<'src> {
    /// Parse every top-level form. A form that fails to parse is skipped
    /// as a whole and parsing resumes at the next one.
    pub(crate) fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let start = self.pos;
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.pos = start;
                    self.depth = 0;
                    self.skip_datum();
                }
            }
        }
        Program::new(stmts)
    }

    /// Parse a single statement: a define or an expression.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if self.at_define() {
            return self.parse_define();
        }
        self.parse_expression().map(Stmt::ExprPending)
    }

    fn at_define(&self) -> bool {
        self.peek_kind().is_open()
            && matches!(self.look_ahead(1), TokenKind::Identifier(name) if name == "define")
    }

    /// `(define name expr)` or `(define (name param ...) body)`.
    ///
    /// The function form is shorthand for binding a lambda; the lambda's
    /// span covers the whole define.
    fn parse_define(&mut self) -> Option<Stmt> {
        let open = self.advance();
        self.advance(); // eat `define`

        if !self.peek_kind().is_open() {
            let name = self.expect_identifier(DEFINE_USAGE)?;
            let value = self.parse_form_part(DEFINE_USAGE)?;
            self.expect_close(&open, DEFINE_USAGE)?;
            return Some(Stmt::DefinePending { name, value });
        }

        let sig_open = self.advance();
        let name = self.expect_identifier(DEFINE_USAGE)?;
        let mut params = Vec::new();
        while !self.at_form_end() {
            params.push(self.expect_identifier(DEFINE_USAGE)?);
        }
        self.expect_close(&sig_open, DEFINE_USAGE)?;
        let body = self.parse_form_part(DEFINE_USAGE)?;
        let end = self.expect_close(&open, DEFINE_USAGE)?;
        let value = Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            open.span.merge(end),
        );
        Some(Stmt::DefinePending { name, value })
    }
}
