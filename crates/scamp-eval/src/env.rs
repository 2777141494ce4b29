//! Immutable variable environment for the Scamp stepper.

use scamp_types::ast::Expr;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name → value bindings published by completed `define` statements.
///
/// Never mutated in place: [`extend`](Environment::extend) returns a new
/// environment and leaves the receiver untouched, so any number of
/// program states can share one instance.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Arc<BTreeMap<String, Expr>>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a name.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.bindings.get(name)
    }

    /// Check whether a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// A new environment with `name` bound to `value`; a previous binding
    /// of the same name is replaced in the result only.
    pub fn extend(&self, name: impl Into<String>, value: Expr) -> Environment {
        let mut bindings = BTreeMap::clone(&self.bindings);
        bindings.insert(name.into(), value);
        Environment {
            bindings: Arc::new(bindings),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bound names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// True when both environments are the same shared instance.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.bindings == other.bindings
    }
}

impl<S: Into<String>> FromIterator<(S, Expr)> for Environment {
    fn from_iter<T: IntoIterator<Item = (S, Expr)>>(iter: T) -> Self {
        Environment {
            bindings: Arc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_leaves_original_untouched() {
        let base = Environment::new().extend("x", Expr::number(1.0));
        let extended = base.extend("x", Expr::number(2.0));
        assert_eq!(base.get("x"), Some(&Expr::number(1.0)));
        assert_eq!(extended.get("x"), Some(&Expr::number(2.0)));
        assert!(!base.ptr_eq(&extended));
    }

    #[test]
    fn test_clone_shares_bindings() {
        let env = Environment::new().extend("a", Expr::bool(true));
        let copy = env.clone();
        assert!(env.ptr_eq(&copy));
        assert_eq!(env, copy);
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let env: Environment = [("b", Expr::number(2.0)), ("a", Expr::number(1.0))]
            .into_iter()
            .collect();
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(env.len(), 2);
        assert!(!env.is_empty());
        assert!(env.contains("a"));
        assert!(!env.contains("c"));
    }
}
