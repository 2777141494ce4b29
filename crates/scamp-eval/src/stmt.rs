//! Lifting a single reduction to one program statement.

use scamp_types::ast::{Expr, Stmt};

use crate::env::Environment;
use crate::stepper::step;

/// Advance `stmt` by one step in `env`.
///
/// Returns the environment to use from now on together with the new
/// statement. Only a define whose value is fully reduced changes the
/// environment; a failed step leaves it untouched and turns the statement
/// into [`Stmt::Error`]. Terminal statements come back unchanged.
pub fn step_stmt(env: &Environment, stmt: &Stmt) -> (Environment, Stmt) {
    match stmt {
        Stmt::ExprDone(_) | Stmt::DefineDone { .. } | Stmt::Error(_) => (env.clone(), stmt.clone()),
        Stmt::DefinePending { name, value } if value.is_value() => (
            env.extend(name.name.clone(), value.clone()),
            Stmt::DefineDone {
                name: name.clone(),
                value: value.clone(),
            },
        ),
        Stmt::DefinePending { name, value } => {
            let next = match step(env, value) {
                Ok(value) => Stmt::DefinePending {
                    name: name.clone(),
                    value,
                },
                Err(err) => Stmt::Error(err),
            };
            (env.clone(), next)
        }
        Stmt::ExprPending(expr) if expr.is_value() => (env.clone(), Stmt::ExprDone(expr.clone())),
        Stmt::ExprPending(expr) => {
            let next = match step(env, expr) {
                Ok(expr) => Stmt::ExprPending(expr),
                Err(err) => Stmt::Error(err),
            };
            (env.clone(), next)
        }
    }
}

/// The expression a non-terminal statement is still reducing.
pub fn pending_expr(stmt: &Stmt) -> Option<&Expr> {
    match stmt {
        Stmt::ExprPending(expr) | Stmt::DefinePending { value: expr, .. } => Some(expr),
        _ => None,
    }
}
