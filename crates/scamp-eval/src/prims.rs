//! Built-in primitive operations.
//!
//! Primitives are strict: every argument is already a value when they
//! run, nothing is coerced (`(+ 1 "2")` fails, `(not 0)` fails), and
//! arity is checked before dispatch. They are reachable only in call
//! head position, under a name that no `define` has taken.
//!
//! ```scheme
//! (+ 1 2 3)              ; 6
//! (car (list 1 2))       ; 1
//! (string-append "a" "b") ; "ab"
//! ```

use scamp_types::ast::{Expr, ExprKind, Lit};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::RuntimeError;

/// Number of arguments a callable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Implementation signature: primitive name and evaluated arguments.
type PrimOp = fn(&str, &[Expr]) -> Result<Expr, RuntimeError>;

/// One entry of the primitive table.
pub struct Primitive {
    pub name: &'static str,
    pub arity: Arity,
    op: PrimOp,
}

static PRIMITIVES: LazyLock<BTreeMap<&'static str, Primitive>> = LazyLock::new(|| {
    let table: [(&'static str, Arity, PrimOp); 26] = [
        ("+", Arity::AtLeast(0), prim_add),
        ("-", Arity::AtLeast(1), prim_sub),
        ("*", Arity::AtLeast(0), prim_mul),
        ("/", Arity::AtLeast(1), prim_div),
        ("quotient", Arity::Exact(2), prim_quotient),
        ("remainder", Arity::Exact(2), prim_remainder),
        ("=", Arity::AtLeast(1), |p, a| compare(p, a, |x, y| x == y)),
        ("<", Arity::AtLeast(1), |p, a| compare(p, a, |x, y| x < y)),
        (">", Arity::AtLeast(1), |p, a| compare(p, a, |x, y| x > y)),
        ("<=", Arity::AtLeast(1), |p, a| compare(p, a, |x, y| x <= y)),
        (">=", Arity::AtLeast(1), |p, a| compare(p, a, |x, y| x >= y)),
        ("zero?", Arity::Exact(1), |p, a| Ok(Expr::bool(number(p, &a[0])? == 0.0))),
        ("not", Arity::Exact(1), |p, a| Ok(Expr::bool(!boolean(p, &a[0])?))),
        ("equal?", Arity::Exact(2), |_, a| Ok(Expr::bool(a[0] == a[1]))),
        ("cons", Arity::Exact(2), |_, a| Ok(Expr::pair(a[0].clone(), a[1].clone()))),
        ("car", Arity::Exact(1), |p, a| pair(p, &a[0]).map(|(first, _)| first.clone())),
        ("cdr", Arity::Exact(1), |p, a| pair(p, &a[0]).map(|(_, rest)| rest.clone())),
        ("list", Arity::AtLeast(0), |_, a| Ok(Expr::list(a.to_vec()))),
        ("null?", Arity::Exact(1), |_, a| Ok(Expr::bool(matches!(a[0].kind, ExprKind::Nil)))),
        ("pair?", Arity::Exact(1), |_, a| Ok(Expr::bool(matches!(a[0].kind, ExprKind::Pair(..))))),
        ("number?", Arity::Exact(1), |_, a| Ok(Expr::bool(a[0].as_number().is_some()))),
        ("string?", Arity::Exact(1), |_, a| {
            Ok(Expr::bool(matches!(a[0].kind, ExprKind::Lit(Lit::Str(_)))))
        }),
        ("boolean?", Arity::Exact(1), |_, a| Ok(Expr::bool(a[0].as_bool().is_some()))),
        ("procedure?", Arity::Exact(1), |_, a| {
            Ok(Expr::bool(matches!(a[0].kind, ExprKind::Lambda { .. })))
        }),
        ("string-append", Arity::AtLeast(0), prim_string_append),
        ("string-length", Arity::Exact(1), |p, a| {
            Ok(Expr::number(string(p, &a[0])?.chars().count() as f64))
        }),
    ];
    table
        .into_iter()
        .map(|(name, arity, op)| (name, Primitive { name, arity, op }))
        .collect()
});

/// Check whether `name` is a primitive.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains_key(name)
}

/// Look up a primitive by name.
pub fn lookup(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.get(name)
}

/// All primitive names, sorted.
pub fn names() -> impl Iterator<Item = &'static str> {
    PRIMITIVES.keys().copied()
}

/// Apply primitive `name` to evaluated `args`. `call` is the whole call
/// expression and locates any failure.
pub fn apply(name: &str, args: &[Expr], call: &Expr) -> scamp_types::Result<Expr> {
    let prim = lookup(name)
        .ok_or_else(|| RuntimeError::UndefinedTopLevelName(name.to_string()).at(call))?;
    if !prim.arity.accepts(args.len()) {
        return Err(RuntimeError::ArityMismatch {
            callee: name.to_string(),
            expected: prim.arity,
            found: args.len(),
        }
        .at(call));
    }
    (prim.op)(name, args).map_err(|err| err.at(call))
}

// ── Argument Extraction ──────────────────────────────────────────────────────

fn mismatch(prim: &str, expected: &'static str, found: &Expr) -> RuntimeError {
    RuntimeError::PrimitiveType {
        prim: prim.to_string(),
        expected,
        found: found.describe(),
    }
}

fn number(prim: &str, arg: &Expr) -> Result<f64, RuntimeError> {
    arg.as_number().ok_or_else(|| mismatch(prim, "number", arg))
}

fn integer(prim: &str, arg: &Expr) -> Result<f64, RuntimeError> {
    let n = number(prim, arg)?;
    if n.fract() == 0.0 {
        Ok(n)
    } else {
        Err(mismatch(prim, "integer", arg))
    }
}

fn boolean(prim: &str, arg: &Expr) -> Result<bool, RuntimeError> {
    arg.as_bool().ok_or_else(|| mismatch(prim, "boolean", arg))
}

fn string<'a>(prim: &str, arg: &'a Expr) -> Result<&'a str, RuntimeError> {
    match &arg.kind {
        ExprKind::Lit(Lit::Str(s)) => Ok(s),
        _ => Err(mismatch(prim, "string", arg)),
    }
}

fn pair<'a>(prim: &str, arg: &'a Expr) -> Result<(&'a Expr, &'a Expr), RuntimeError> {
    match &arg.kind {
        ExprKind::Pair(first, rest) => Ok((first, rest)),
        _ => Err(mismatch(prim, "pair", arg)),
    }
}

fn numbers(prim: &str, args: &[Expr]) -> Result<Vec<f64>, RuntimeError> {
    args.iter().map(|a| number(prim, a)).collect()
}

// ── Implementations ──────────────────────────────────────────────────────────

fn prim_add(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    Ok(Expr::number(numbers(prim, args)?.into_iter().sum()))
}

fn prim_mul(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    Ok(Expr::number(numbers(prim, args)?.into_iter().product()))
}

fn prim_sub(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    let nums = numbers(prim, args)?;
    let result = match nums.as_slice() {
        [only] => -only,
        [first, rest @ ..] => rest.iter().fold(*first, |acc, n| acc - n),
        [] => 0.0,
    };
    Ok(Expr::number(result))
}

fn prim_div(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    let nums = numbers(prim, args)?;
    let (first, rest) = match nums.as_slice() {
        [only] => (1.0, std::slice::from_ref(only)),
        [first, rest @ ..] => (*first, rest),
        [] => (1.0, &[][..]),
    };
    let mut acc = first;
    for divisor in rest {
        if *divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero(prim.to_string()));
        }
        acc /= divisor;
    }
    Ok(Expr::number(acc))
}

fn integer_pair(prim: &str, args: &[Expr]) -> Result<(f64, f64), RuntimeError> {
    let a = integer(prim, &args[0])?;
    let b = integer(prim, &args[1])?;
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero(prim.to_string()));
    }
    Ok((a, b))
}

fn prim_quotient(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    let (a, b) = integer_pair(prim, args)?;
    Ok(Expr::number((a / b).trunc()))
}

/// Sign follows the dividend.
fn prim_remainder(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    let (a, b) = integer_pair(prim, args)?;
    Ok(Expr::number(a % b))
}

/// Chained comparison: `(< 1 2 3)` holds when every adjacent pair does.
fn compare(prim: &str, args: &[Expr], holds: fn(f64, f64) -> bool) -> Result<Expr, RuntimeError> {
    let nums = numbers(prim, args)?;
    Ok(Expr::bool(nums.windows(2).all(|w| holds(w[0], w[1]))))
}

fn prim_string_append(prim: &str, args: &[Expr]) -> Result<Expr, RuntimeError> {
    let mut out = String::new();
    for arg in args {
        out.push_str(string(prim, arg)?);
    }
    Ok(Expr::string(out))
}
