//! Substitution of values for free names.
//!
//! No alpha-renaming is performed. A binder whose name matches stops the
//! substitution beneath it, so a free name inside `value` that happens to
//! share its spelling with an inner binder would be captured. Values
//! reaching substitution are normally closed, which keeps this benign in
//! practice.

use scamp_types::ast::{Binding, CondBranch, Expr, ExprKind, Ident};

const STACK_RED_ZONE: usize = 256 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Replace every free occurrence of `name` in `target` with `value`.
///
/// Nodes keep their own spans; the inserted `value` keeps its span.
pub fn substitute(value: &Expr, name: &str, target: &Expr) -> Expr {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        substitute_node(value, name, target)
    })
}

fn substitute_node(value: &Expr, name: &str, target: &Expr) -> Expr {
    let sub = |e: &Expr| substitute(value, name, e);
    let sub_box = |e: &Expr| Box::new(substitute(value, name, e));

    let kind = match &target.kind {
        ExprKind::Var(x) if x == name => return value.clone(),
        ExprKind::Var(_) | ExprKind::Lit(_) | ExprKind::Nil => return target.clone(),
        ExprKind::Lambda { params, .. } if params.iter().any(|p| p.name == name) => {
            return target.clone()
        }
        ExprKind::Lambda { params, body } => ExprKind::Lambda {
            params: params.clone(),
            body: sub_box(body),
        },
        ExprKind::Call { head, args } => ExprKind::Call {
            head: sub_box(head),
            args: args.iter().map(sub).collect(),
        },
        ExprKind::If {
            test,
            then_branch,
            else_branch,
        } => ExprKind::If {
            test: sub_box(test),
            then_branch: sub_box(then_branch),
            else_branch: sub_box(else_branch),
        },
        ExprKind::Pair(first, rest) => ExprKind::Pair(sub_box(first), sub_box(rest)),
        ExprKind::Let { bindings, body } => {
            let (bindings, body) = substitute_telescope(value, name, bindings, body);
            ExprKind::Let {
                bindings,
                body: Box::new(body),
            }
        }
        ExprKind::Cond(branches) => ExprKind::Cond(
            branches
                .iter()
                .map(|b| CondBranch {
                    guard: sub(&b.guard),
                    body: sub(&b.body),
                })
                .collect(),
        ),
        ExprKind::And(args) => ExprKind::And(args.iter().map(sub).collect()),
        ExprKind::Or(args) => ExprKind::Or(args.iter().map(sub).collect()),
    };
    Expr {
        kind,
        span: target.span,
    }
}

/// Substitute through sequential `let` bindings and their body.
///
/// Each right-hand side sees the bindings before it. The first binding
/// that rebinds `name` still has its right-hand side rewritten (it sees the
/// outer `name`), but every later binding and the body see the new binding
/// and are left alone.
pub fn substitute_telescope(
    value: &Expr,
    name: &str,
    bindings: &[Binding],
    body: &Expr,
) -> (Vec<Binding>, Expr) {
    let mut out = Vec::with_capacity(bindings.len());
    let mut shadowed = false;
    for binding in bindings {
        if shadowed {
            out.push(binding.clone());
            continue;
        }
        out.push(Binding {
            name: binding.name.clone(),
            value: substitute(value, name, &binding.value),
        });
        shadowed = binding.name.name == name;
    }
    let body = if shadowed {
        body.clone()
    } else {
        substitute(value, name, body)
    };
    (out, body)
}

/// Substitute `values` for `params` into `body`, in parameter order.
pub fn substitute_all(values: &[Expr], params: &[Ident], body: &Expr) -> Expr {
    values
        .iter()
        .zip(params)
        .fold(body.clone(), |acc, (value, param)| {
            substitute(value, &param.name, &acc)
        })
}
