//! The single-step reduction relation.
//!
//! [`step`] performs exactly one reduction of the left-most redex and is a
//! pure function of its inputs. Reduction order:
//!
//! - call: head (unless it is a value or a bare name), then arguments left
//!   to right, then application.
//! - `if`, `cond`: the guard first, then pick a branch.
//! - `and`, `or`: one operand at a time, short-circuiting.
//! - `let`: one binding at a time, substituting each value into the rest.
//!
//! Partly reduced `cond`/`and`/`or` forms are re-wrapped without a span so
//! they can be told apart from what the parser produced.
//!
//! Finding the redex recurses once per level of nesting. The stack grows on
//! demand, and the search gives up with `recursion-depth-exceeded` below
//! [`MAX_STEP_DEPTH`] levels.

use scamp_types::ast::{Binding, CondBranch, Expr, ExprKind, Ident};
use scamp_types::Result;

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::prims::{self, Arity};
use crate::subst::{substitute, substitute_all, substitute_telescope};

/// Deepest nesting [`step`] will descend into to find the redex.
pub const MAX_STEP_DEPTH: usize = 10_000;

/// Grow the stack when less than this much is left.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each newly allocated stack segment.
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Step budget for the bounded evaluation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gas {
    /// Steps taken so far.
    pub used: u64,
    /// Maximum number of steps.
    pub limit: u64,
}

impl Gas {
    pub fn new(limit: u64) -> Self {
        Self { used: 0, limit }
    }

    /// Consume one step. Fails once the limit has been spent.
    pub fn tick(&mut self) -> std::result::Result<(), RuntimeError> {
        if self.used >= self.limit {
            return Err(RuntimeError::StepLimitExceeded(self.limit));
        }
        self.used += 1;
        Ok(())
    }
}

/// Perform one reduction of `expr` in `env`.
///
/// Stepping a value is a caller error and reports
/// `internal-consistency-error`.
pub fn step(env: &Environment, expr: &Expr) -> Result<Expr> {
    step_at(env, expr, 0)
}

fn step_at(env: &Environment, expr: &Expr, depth: usize) -> Result<Expr> {
    if depth > MAX_STEP_DEPTH {
        return Err(RuntimeError::DepthExceeded(MAX_STEP_DEPTH).at(expr));
    }
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || step_node(env, expr, depth))
}

fn step_node(env: &Environment, expr: &Expr, depth: usize) -> Result<Expr> {
    let inner = depth + 1;
    match &expr.kind {
        ExprKind::Var(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()).at(expr)),
        ExprKind::Lit(_) | ExprKind::Lambda { .. } | ExprKind::Nil => {
            Err(RuntimeError::SteppedValue(expr.describe()).at(expr))
        }
        ExprKind::Call { head, args } => step_call(env, expr, head, args, inner),
        ExprKind::If {
            test,
            then_branch,
            else_branch,
        } => {
            if !test.is_value() {
                let kind = ExprKind::If {
                    test: Box::new(step_at(env, test, inner)?),
                    then_branch: then_branch.clone(),
                    else_branch: else_branch.clone(),
                };
                return Ok(Expr::new(kind, expr.span));
            }
            match test.as_bool() {
                Some(true) => Ok((**then_branch).clone()),
                Some(false) => Ok((**else_branch).clone()),
                None => Err(RuntimeError::NonBooleanGuard(test.describe()).at(expr)),
            }
        }
        ExprKind::Pair(first, rest) => {
            let kind = if !first.is_value() {
                ExprKind::Pair(Box::new(step_at(env, first, inner)?), rest.clone())
            } else if !rest.is_value() {
                ExprKind::Pair(first.clone(), Box::new(step_at(env, rest, inner)?))
            } else {
                return Err(RuntimeError::SteppedValue(expr.describe()).at(expr));
            };
            Ok(Expr::new(kind, expr.span))
        }
        ExprKind::Let { bindings, body } => step_let(env, expr, bindings, body, inner),
        ExprKind::Cond(branches) => step_cond(env, expr, branches, inner),
        ExprKind::And(args) => step_connective(env, expr, args, Connective::And, inner),
        ExprKind::Or(args) => step_connective(env, expr, args, Connective::Or, inner),
    }
}

/// Copy `items` with the element at `index` replaced by `new`. The replaced
/// element is never cloned.
fn replace_at<T: Clone>(items: &[T], index: usize, new: T) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    out.extend_from_slice(&items[..index]);
    out.push(new);
    out.extend_from_slice(&items[index + 1..]);
    out
}

fn step_call(
    env: &Environment,
    expr: &Expr,
    head: &Expr,
    args: &[Expr],
    depth: usize,
) -> Result<Expr> {
    let rebuild = |head: Expr, args: Vec<Expr>| {
        Expr::new(
            ExprKind::Call {
                head: Box::new(head),
                args,
            },
            expr.span,
        )
    };

    if !head.is_value() && !matches!(head.kind, ExprKind::Var(_)) {
        return Ok(rebuild(step_at(env, head, depth)?, args.to_vec()));
    }

    if let Some(i) = args.iter().position(|a| !a.is_value()) {
        let stepped = step_at(env, &args[i], depth)?;
        return Ok(rebuild(head.clone(), replace_at(args, i, stepped)));
    }

    match &head.kind {
        ExprKind::Lambda { params, body } => apply_lambda("lambda", params, body, args, expr),
        ExprKind::Var(name) => match env.get(name) {
            // Looking up the head and applying it is a single step.
            Some(value) => match &value.kind {
                ExprKind::Lambda { params, body } => apply_lambda(name, params, body, args, expr),
                _ => Err(RuntimeError::NotCallable(value.describe()).at(expr)),
            },
            None if prims::is_primitive(name) => prims::apply(name, args, expr),
            None => Err(RuntimeError::UndefinedTopLevelName(name.clone()).at(expr)),
        },
        _ => Err(RuntimeError::NotCallable(head.describe()).at(expr)),
    }
}

fn apply_lambda(
    callee: &str,
    params: &[Ident],
    body: &Expr,
    args: &[Expr],
    call: &Expr,
) -> Result<Expr> {
    if params.len() != args.len() {
        return Err(RuntimeError::ArityMismatch {
            callee: callee.to_string(),
            expected: Arity::Exact(params.len()),
            found: args.len(),
        }
        .at(call));
    }
    Ok(substitute_all(args, params, body))
}

fn step_let(
    env: &Environment,
    expr: &Expr,
    bindings: &[Binding],
    body: &Expr,
    depth: usize,
) -> Result<Expr> {
    let Some((first, rest)) = bindings.split_first() else {
        return Ok(body.clone());
    };

    if !first.value.is_value() {
        let stepped = Binding {
            name: first.name.clone(),
            value: step_at(env, &first.value, depth)?,
        };
        let kind = ExprKind::Let {
            bindings: replace_at(bindings, 0, stepped),
            body: Box::new(body.clone()),
        };
        return Ok(Expr::new(kind, expr.span));
    }

    let name = &first.name.name;
    if rest.is_empty() {
        return Ok(substitute(&first.value, name, body));
    }
    let (bindings, body) = substitute_telescope(&first.value, name, rest, body);
    let kind = ExprKind::Let {
        bindings,
        body: Box::new(body),
    };
    Ok(Expr::new(kind, expr.span))
}

fn step_cond(env: &Environment, expr: &Expr, branches: &[CondBranch], depth: usize) -> Result<Expr> {
    let Some((first, rest)) = branches.split_first() else {
        return Err(RuntimeError::CondExhausted.at(expr));
    };

    if !first.guard.is_value() {
        let stepped = CondBranch {
            guard: step_at(env, &first.guard, depth)?,
            body: first.body.clone(),
        };
        let branches = replace_at(branches, 0, stepped);
        return Ok(Expr::new(ExprKind::Cond(branches), expr.span));
    }

    match first.guard.as_bool() {
        Some(true) => Ok(first.body.clone()),
        Some(false) => Ok(Expr::synthetic(ExprKind::Cond(rest.to_vec()))),
        None => Err(RuntimeError::NonBooleanGuard(first.guard.describe()).at(expr)),
    }
}

#[derive(Clone, Copy)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn name(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }

    /// Result of the empty form; also the operand value that is skipped.
    fn identity(self) -> bool {
        matches!(self, Connective::And)
    }

    fn wrap(self, args: Vec<Expr>) -> ExprKind {
        match self {
            Connective::And => ExprKind::And(args),
            Connective::Or => ExprKind::Or(args),
        }
    }
}

fn step_connective(
    env: &Environment,
    expr: &Expr,
    args: &[Expr],
    connective: Connective,
    depth: usize,
) -> Result<Expr> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Expr::bool(connective.identity()));
    };

    if !first.is_value() {
        let stepped = step_at(env, first, depth)?;
        return Ok(Expr::new(connective.wrap(replace_at(args, 0, stepped)), expr.span));
    }

    match first.as_bool() {
        Some(b) if b == connective.identity() => {
            Ok(Expr::synthetic(connective.wrap(rest.to_vec())))
        }
        Some(b) => Ok(Expr::bool(b)),
        None => Err(RuntimeError::NonBooleanOperand {
            form: connective.name(),
            found: first.describe(),
        }
        .at(expr)),
    }
}

/// Step `expr` until it is a value.
///
/// Unbounded: a diverging expression never returns. See
/// [`evaluate_with_gas`] for a bounded variant.
pub fn evaluate(env: &Environment, expr: &Expr) -> Result<Expr> {
    let mut current = expr.clone();
    while !current.is_value() {
        current = step(env, &current)?;
    }
    Ok(current)
}

/// Step `expr` until it is a value, taking at most `limit` steps.
pub fn evaluate_with_gas(env: &Environment, expr: &Expr, limit: u64) -> Result<Expr> {
    let mut gas = Gas::new(limit);
    let mut current = expr.clone();
    while !current.is_value() {
        gas.tick().map_err(|err| err.at(&current))?;
        current = step(env, &current)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scamp_types::ErrorCode;

    #[test]
    fn test_gas_tick() {
        let mut gas = Gas::new(2);
        assert!(gas.tick().is_ok());
        assert!(gas.tick().is_ok());
        assert_eq!(gas.tick(), Err(RuntimeError::StepLimitExceeded(2)));
        assert_eq!(gas.used, 2);
    }

    #[test]
    fn test_step_value_is_contract_violation() {
        let err = step(&Environment::new(), &Expr::number(1.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_CONSISTENCY);
    }

    #[test]
    fn test_if_steps_guard_in_place() {
        let expr = Expr::if_(
            Expr::call(Expr::var("not"), vec![Expr::bool(true)]),
            Expr::number(1.0),
            Expr::number(2.0),
        );
        let once = step(&Environment::new(), &expr).unwrap();
        assert_eq!(once, Expr::if_(Expr::bool(false), Expr::number(1.0), Expr::number(2.0)));
        let twice = step(&Environment::new(), &once).unwrap();
        assert_eq!(twice, Expr::number(2.0));
    }

    #[test]
    fn test_connective_drops_operand_into_synthetic_form() {
        let expr = Expr::or(vec![Expr::bool(false), Expr::var("x")]);
        let next = step(&Environment::new(), &expr).unwrap();
        assert_eq!(next, Expr::or(vec![Expr::var("x")]));
        assert!(next.is_synthetic_form());
    }
}
