//! Name environment with lexically scoped bindings.
//!
//! [`ScopeEnv`] is a stack of scopes. The root scope holds top-level
//! defines (and, when checking against a running program, the names its
//! environment already binds); `lambda` and `let` push inner scopes.

use std::collections::HashSet;

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Top-level defines.
    Program,
    /// Parameters of a `lambda`.
    Lambda,
    /// One `let` binding; each binding gets its own scope so later
    /// bindings may rebind a name.
    Let,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    names: HashSet<String>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            names: HashSet::new(),
        }
    }
}

/// A stack of scopes for name resolution.
#[derive(Debug)]
pub struct ScopeEnv {
    scopes: Vec<Scope>,
}

impl ScopeEnv {
    /// Create an environment with an empty program scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Program)],
        }
    }

    /// Push a new scope onto the stack.
    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    /// Pop the top scope. The program scope is never popped.
    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the program scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the current scope.
    /// Returns `false` if the current scope already binds it.
    pub fn define(&mut self, name: &str) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.names.insert(name.to_string()),
            None => false,
        }
    }

    /// Check whether `name` is bound in any enclosing scope.
    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.names.contains(name))
    }

    /// Check if a name is bound in the **current** scope only.
    pub fn defined_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|s| s.names.contains(name))
    }

    /// Kind of the innermost scope.
    pub fn current_scope_kind(&self) -> ScopeKind {
        self.scopes.last().map_or(ScopeKind::Program, |s| s.kind)
    }

    /// Every bound name, innermost scopes first.
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.names.iter().map(String::as_str))
    }
}

impl Default for ScopeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_sees_outer() {
        let mut env = ScopeEnv::new();
        env.define("f");
        env.push_scope(ScopeKind::Lambda);
        env.define("x");
        assert!(env.is_bound("f"));
        assert!(env.is_bound("x"));
        assert!(!env.defined_in_current_scope("f"));
        assert_eq!(env.current_scope_kind(), ScopeKind::Lambda);
        env.pop_scope();
        assert!(!env.is_bound("x"));
        assert_eq!(env.current_scope_kind(), ScopeKind::Program);
    }

    #[test]
    fn test_define_reports_duplicates_in_same_scope() {
        let mut env = ScopeEnv::new();
        assert!(env.define("a"));
        assert!(!env.define("a"));
        env.push_scope(ScopeKind::Let);
        assert!(env.define("a"));
    }
}
