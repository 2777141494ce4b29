//! Rendering trees back to source text.

use crate::ast::{Expr, ExprKind, Lit, Program, Stmt};
use std::fmt::{self, Write};

/// Format a number the way it would be written in source: integral
/// values without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn write_string_lit(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Bool(true) => f.write_str("#t"),
            Lit::Bool(false) => f.write_str("#f"),
            Lit::Number(n) => f.write_str(&format_number(*n)),
            Lit::Str(s) => write_string_lit(f, s),
            Lit::Char(' ') => f.write_str("#\\space"),
            Lit::Char('\n') => f.write_str("#\\newline"),
            Lit::Char(c) => write!(f, "#\\{c}"),
        }
    }
}

/// Writes `items` separated by single spaces, each preceded by one space.
fn write_spaced<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for item in items {
        write!(f, " {item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Var(name) => f.write_str(name),
            ExprKind::Lit(lit) => write!(f, "{lit}"),
            ExprKind::Call { head, args } => {
                write!(f, "({head}")?;
                write_spaced(f, args)?;
                f.write_char(')')
            }
            ExprKind::Lambda { params, body } => {
                f.write_str("(lambda (")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    f.write_str(&p.name)?;
                }
                write!(f, ") {body})")
            }
            ExprKind::If {
                test,
                then_branch,
                else_branch,
            } => write!(f, "(if {test} {then_branch} {else_branch})"),
            ExprKind::Nil => f.write_str("null"),
            ExprKind::Pair(a, b) => write!(f, "(cons {a} {b})"),
            ExprKind::Let { bindings, body } => {
                f.write_str("(let (")?;
                for (i, b) in bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "[{} {}]", b.name.name, b.value)?;
                }
                write!(f, ") {body})")
            }
            ExprKind::Cond(branches) => {
                f.write_str("(cond")?;
                for b in branches {
                    write!(f, " [{} {}]", b.guard, b.body)?;
                }
                f.write_char(')')
            }
            ExprKind::And(args) => {
                f.write_str("(and")?;
                write_spaced(f, args)?;
                f.write_char(')')
            }
            ExprKind::Or(args) => {
                f.write_str("(or")?;
                write_spaced(f, args)?;
                f.write_char(')')
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::ExprPending(e) | Stmt::ExprDone(e) => write!(f, "{e}"),
            Stmt::DefinePending { name, value } | Stmt::DefineDone { name, value } => {
                write!(f, "(define {} {value})", name.name)
            }
            Stmt::Error(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}
