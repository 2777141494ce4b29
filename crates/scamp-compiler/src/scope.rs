//! Static scope checking: rejects references to names nothing binds.
//!
//! Entry points: [`scope_check_program`], [`scope_check_expression`].
//!
//! Error codes emitted:
//! - E200: unbound name
//! - E201: duplicate lambda parameter
//! - E202: duplicate top-level define
//!
//! Every top-level define is in scope for the whole program, so a function
//! may call one defined after it. Whether the callee has finished by the
//! time it is called is a runtime matter (`undefined-variable`).

use scamp_eval::{prims, Environment};
use scamp_types::ast::*;
use scamp_types::{CompileErrors, ErrorCode, ScampError, SourceFile, Span};

use crate::env::{ScopeEnv, ScopeKind};

/// Check a whole program. An empty result means it is well scoped.
pub fn scope_check_program(program: &Program, source: &SourceFile) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    ScopeChecker::new(&mut errors, source).check_program(program);
    errors
}

/// Check an expression that will run in `env`; names `env` binds are in
/// scope.
pub fn scope_check_expression(env: &Environment, expr: &Expr, source: &SourceFile) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    let mut checker = ScopeChecker::new(&mut errors, source);
    checker.bind_environment(env);
    checker.check_expr(expr);
    errors
}

/// Check statements about to be appended to `existing`. The existing
/// program's defines and `env`'s names are in scope. New defines may
/// replace them but must not repeat each other.
pub fn scope_check_appended(
    existing: &Program,
    env: &Environment,
    stmts: &[Stmt],
    source: &SourceFile,
) -> CompileErrors {
    let mut errors = CompileErrors::empty();
    let mut checker = ScopeChecker::new(&mut errors, source);
    checker.bind_environment(env);
    for stmt in existing.iter() {
        if let Some(name) = define_name(stmt) {
            checker.env.define(&name.name);
        }
    }
    checker.env.push_scope(ScopeKind::Program);
    checker.check_stmts(stmts);
    errors
}

fn define_name(stmt: &Stmt) -> Option<&Ident> {
    match stmt {
        Stmt::DefinePending { name, .. } | Stmt::DefineDone { name, .. } => Some(name),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ScopeChecker
// ══════════════════════════════════════════════════════════════════════════════

/// Walks expressions with a [`ScopeEnv`] and records scope errors.
pub struct ScopeChecker<'a> {
    env: ScopeEnv,
    errors: &'a mut CompileErrors,
    source: &'a SourceFile,
}

impl<'a> ScopeChecker<'a> {
    /// Create a new scope checker.
    pub fn new(errors: &'a mut CompileErrors, source: &'a SourceFile) -> Self {
        Self {
            env: ScopeEnv::new(),
            errors,
            source,
        }
    }

    /// Treat every name bound in `env` as defined at the top level.
    pub fn bind_environment(&mut self, env: &Environment) {
        for name in env.names() {
            self.env.define(name);
        }
    }

    /// Check a complete program.
    pub fn check_program(&mut self, program: &Program) {
        self.check_stmts(program.iter());
    }

    fn check_stmts<'s, I>(&mut self, stmts: I)
    where
        I: IntoIterator<Item = &'s Stmt>,
        I::IntoIter: Clone,
    {
        let stmts = stmts.into_iter();
        // 1. Register every define so forward references resolve.
        for name in stmts.clone().filter_map(define_name) {
            if !self.env.define(&name.name) {
                self.error(
                    ErrorCode::DUPLICATE_DEFINE,
                    format!("'{}' is already defined", name.name),
                    name.span,
                    Some("each top-level name can be defined once".to_string()),
                );
            }
        }

        // 2. Check right-hand sides and expression statements.
        for stmt in stmts {
            match stmt {
                Stmt::ExprPending(expr)
                | Stmt::ExprDone(expr)
                | Stmt::DefinePending { value: expr, .. }
                | Stmt::DefineDone { value: expr, .. } => self.check_expr(expr),
                Stmt::Error(_) => {}
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Check one expression in the current scope.
    pub fn check_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Var(name) => self.check_name(name, expr.span),
            ExprKind::Lit(_) | ExprKind::Nil => {}
            ExprKind::Call { head, args } => {
                self.check_expr(head);
                for arg in args {
                    self.check_expr(arg);
                }
            }
            ExprKind::Lambda { params, body } => {
                self.env.push_scope(ScopeKind::Lambda);
                for param in params {
                    if !self.env.define(&param.name) {
                        self.error(
                            ErrorCode::DUPLICATE_PARAMETER,
                            format!("parameter '{}' appears more than once", param.name),
                            param.span,
                            None,
                        );
                    }
                }
                self.check_expr(body);
                self.env.pop_scope();
            }
            ExprKind::If {
                test,
                then_branch,
                else_branch,
            } => {
                self.check_expr(test);
                self.check_expr(then_branch);
                self.check_expr(else_branch);
            }
            ExprKind::Pair(first, rest) => {
                self.check_expr(first);
                self.check_expr(rest);
            }
            ExprKind::Let { bindings, body } => {
                // Each value sees the bindings before it.
                for binding in bindings {
                    self.check_expr(&binding.value);
                    self.env.push_scope(ScopeKind::Let);
                    self.env.define(&binding.name.name);
                }
                self.check_expr(body);
                for _ in bindings {
                    self.env.pop_scope();
                }
            }
            ExprKind::Cond(branches) => {
                for branch in branches {
                    self.check_expr(&branch.guard);
                    self.check_expr(&branch.body);
                }
            }
            ExprKind::And(args) | ExprKind::Or(args) => {
                for arg in args {
                    self.check_expr(arg);
                }
            }
        }
    }

    fn check_name(&mut self, name: &str, span: Option<Span>) {
        if self.env.is_bound(name) || prims::is_primitive(name) {
            return;
        }
        let hint = match self.closest_name(name) {
            Some(close) => format!("did you mean '{close}'?"),
            None => "bind it with define, lambda or let before using it".to_string(),
        };
        self.error(
            ErrorCode::UNBOUND_NAME,
            format!("unbound name '{name}'"),
            span,
            Some(hint),
        );
    }

    /// A visible name or primitive within edit distance 2 of `name`.
    /// Names shorter than three characters get no suggestion.
    fn closest_name(&self, name: &str) -> Option<String> {
        if name.chars().count() < 3 {
            return None;
        }
        self.env
            .visible_names()
            .chain(prims::names().map(|n| -> &str { n }))
            .map(|candidate| (edit_distance(name, candidate), candidate))
            .filter(|(d, _)| *d > 0 && *d <= 2)
            .min()
            .map(|(_, candidate)| candidate.to_string())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Helpers
    // ══════════════════════════════════════════════════════════════════════

    fn error(&mut self, code: ErrorCode, message: String, span: Option<Span>, hint: Option<String>) {
        let mut error = ScampError::new(code, message).with_span(span);
        if let Some(span) = span {
            error = error.with_snippet(self.source.snippet(span));
        }
        if let Some(hint) = hint {
            error = error.with_hint(hint);
        }
        self.errors.push_error(error);
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            row[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(row[j] + 1);
        }
        prev = row;
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("car", "cdr"), 1);
        assert_eq!(edit_distance("lenght", "length"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}
