//! Expression and statement tree for Scamp.
//!
//! Nodes produced by the parser carry a [`Span`]; nodes built by the
//! stepper or by primitives carry none. Spans never take part in
//! equality: two expressions are equal when their shapes are.

use std::ops::Index;
use std::sync::Arc;

use crate::{ScampError, Span};

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A binder name (lambda parameter, let binding, define target).
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Option<Span>,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        Self {
            name: name.into(),
            span: span.into(),
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident {
            name: name.to_string(),
            span: None,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Option<Span>,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Literal payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Bool(bool),
    Number(f64),
    Str(String),
    Char(char),
}

impl Lit {
    /// Name of the literal's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Lit::Bool(_) => "boolean",
            Lit::Number(_) => "number",
            Lit::Str(_) => "string",
            Lit::Char(_) => "char",
        }
    }
}

/// `name e` inside a `let`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Ident,
    pub value: Expr,
}

/// `[guard body]` inside a `cond`.
#[derive(Debug, Clone, PartialEq)]
pub struct CondBranch {
    pub guard: Expr,
    pub body: Expr,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `x`
    Var(String),
    /// `42`, `"hi"`, `#t`, `#\a`
    Lit(Lit),
    /// `(head args...)`
    Call { head: Box<Expr>, args: Vec<Expr> },
    /// `(lambda (params...) body)`
    Lambda { params: Vec<Ident>, body: Box<Expr> },
    /// `(if test then else)`
    If {
        test: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `null`
    Nil,
    /// A cons cell; built by primitives, never by the parser.
    Pair(Box<Expr>, Box<Expr>),
    /// `(let ([x e] ...) body)`, bindings see the ones before them.
    Let { bindings: Vec<Binding>, body: Box<Expr> },
    /// `(cond [guard body] ...)`
    Cond(Vec<CondBranch>),
    /// `(and args...)`
    And(Vec<Expr>),
    /// `(or args...)`
    Or(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: impl Into<Option<Span>>) -> Self {
        Self {
            kind,
            span: span.into(),
        }
    }

    /// An unlocated node.
    pub fn synthetic(kind: ExprKind) -> Self {
        Self { kind, span: None }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::synthetic(ExprKind::Var(name.into()))
    }

    pub fn lit(lit: Lit) -> Self {
        Self::synthetic(ExprKind::Lit(lit))
    }

    pub fn bool(b: bool) -> Self {
        Self::lit(Lit::Bool(b))
    }

    pub fn number(n: f64) -> Self {
        Self::lit(Lit::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::lit(Lit::Str(s.into()))
    }

    pub fn nil() -> Self {
        Self::synthetic(ExprKind::Nil)
    }

    pub fn call(head: Expr, args: Vec<Expr>) -> Self {
        Self::synthetic(ExprKind::Call {
            head: Box::new(head),
            args,
        })
    }

    pub fn lambda<I: Into<Ident>>(params: impl IntoIterator<Item = I>, body: Expr) -> Self {
        Self::synthetic(ExprKind::Lambda {
            params: params.into_iter().map(Into::into).collect(),
            body: Box::new(body),
        })
    }

    pub fn if_(test: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Self::synthetic(ExprKind::If {
            test: Box::new(test),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn pair(first: Expr, second: Expr) -> Self {
        Self::synthetic(ExprKind::Pair(Box::new(first), Box::new(second)))
    }

    pub fn let_<I: Into<Ident>>(bindings: impl IntoIterator<Item = (I, Expr)>, body: Expr) -> Self {
        Self::synthetic(ExprKind::Let {
            bindings: bindings
                .into_iter()
                .map(|(name, value)| Binding {
                    name: name.into(),
                    value,
                })
                .collect(),
            body: Box::new(body),
        })
    }

    pub fn cond(branches: impl IntoIterator<Item = (Expr, Expr)>) -> Self {
        Self::synthetic(ExprKind::Cond(
            branches
                .into_iter()
                .map(|(guard, body)| CondBranch { guard, body })
                .collect(),
        ))
    }

    pub fn and(args: Vec<Expr>) -> Self {
        Self::synthetic(ExprKind::And(args))
    }

    pub fn or(args: Vec<Expr>) -> Self {
        Self::synthetic(ExprKind::Or(args))
    }

    /// Build a proper list `(cons e1 (cons e2 ... null))`.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Expr::nil(), |tail, head| Expr::pair(head, tail))
    }

    /// Irreducible expressions: literals, lambdas, `null`, and pairs of values.
    pub fn is_value(&self) -> bool {
        match &self.kind {
            ExprKind::Lit(_) | ExprKind::Lambda { .. } | ExprKind::Nil => true,
            ExprKind::Pair(a, b) => a.is_value() && b.is_value(),
            _ => false,
        }
    }

    /// The boolean payload of a boolean literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ExprKind::Lit(Lit::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// The numeric payload of a number literal.
    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            ExprKind::Lit(Lit::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// True for nodes the stepper created to carry partially-reduced
    /// `cond`/`and`/`or` forms between steps.
    pub fn is_synthetic_form(&self) -> bool {
        self.span.is_none()
            && matches!(
                self.kind,
                ExprKind::Cond(_) | ExprKind::And(_) | ExprKind::Or(_)
            )
    }

    /// Short description of the node's variant (or literal type), for errors.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::Var(_) => "variable",
            ExprKind::Lit(lit) => lit.type_name(),
            ExprKind::Call { .. } => "call",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::If { .. } => "if",
            ExprKind::Nil => "null",
            ExprKind::Pair(..) => "pair",
            ExprKind::Let { .. } => "let",
            ExprKind::Cond(_) => "cond",
            ExprKind::And(_) => "and",
            ExprKind::Or(_) => "or",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// One program line and its evaluation status.
///
/// `ExprDone`, `DefineDone` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// An expression still being reduced.
    ExprPending(Expr),
    /// A fully reduced expression statement.
    ExprDone(Expr),
    /// `(define name e)` whose right-hand side is still being reduced.
    DefinePending { name: Ident, value: Expr },
    /// A define whose value has been published to the environment.
    DefineDone { name: Ident, value: Expr },
    /// A statement whose reduction failed.
    Error(ScampError),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::ExprPending(expr)
    }

    pub fn define(name: impl Into<Ident>, value: Expr) -> Self {
        Stmt::DefinePending {
            name: name.into(),
            value,
        }
    }

    /// Terminal statements never transition again.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            Stmt::ExprDone(_) | Stmt::DefineDone { .. } | Stmt::Error(_)
        )
    }

    /// Short lowercase name of the statement's state.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::ExprPending(_) => "expression",
            Stmt::ExprDone(_) => "value",
            Stmt::DefinePending { .. } => "define",
            Stmt::DefineDone { .. } => "binding",
            Stmt::Error(_) => "error",
        }
    }
}

/// An ordered, index-stable sequence of statements.
///
/// Statements are held behind `Arc`: a program derived with
/// [`Program::with_stmt`] shares every statement it did not replace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    stmts: Vec<Arc<Stmt>>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts: stmts.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stmt> {
        self.stmts.get(index).map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Stmt> + Clone + '_ {
        self.stmts.iter().map(Arc::as_ref)
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(Arc::new(stmt));
    }

    /// A copy of this program with statement `index` replaced. Every other
    /// statement is shared with `self`. Out of range leaves it unchanged.
    pub fn with_stmt(&self, index: usize, stmt: Stmt) -> Program {
        let mut stmts = self.stmts.clone();
        if let Some(slot) = stmts.get_mut(index) {
            *slot = Arc::new(stmt);
        }
        Program { stmts }
    }

    /// True if both programs hold the same allocation for statement `index`.
    pub fn shares_stmt(&self, other: &Program, index: usize) -> bool {
        match (self.stmts.get(index), other.stmts.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Take the statements out, cloning only those still shared.
    pub fn into_stmts(self) -> Vec<Stmt> {
        self.stmts.into_iter().map(Arc::unwrap_or_clone).collect()
    }

    /// True once every statement is terminal.
    pub fn is_fully_evaluated(&self) -> bool {
        self.iter().all(Stmt::is_done)
    }

    /// Index of the left-most non-terminal statement.
    pub fn index_of_current_stmt(&self) -> Option<usize> {
        self.iter().position(|s| !s.is_done())
    }
}

impl Index<usize> for Program {
    type Output = Stmt;

    fn index(&self, index: usize) -> &Stmt {
        &self.stmts[index]
    }
}

impl From<Vec<Stmt>> for Program {
    fn from(stmts: Vec<Stmt>) -> Self {
        Program::new(stmts)
    }
}

impl Extend<Stmt> for Program {
    fn extend<I: IntoIterator<Item = Stmt>>(&mut self, iter: I) {
        self.stmts.extend(iter.into_iter().map(Arc::new));
    }
}
