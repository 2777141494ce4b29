//! Runtime error types for the Scamp stepper.

use scamp_types::ast::Expr;
use scamp_types::{ErrorCode, ScampError};
use thiserror::Error;

use crate::prims::Arity;

/// A failed reduction.
///
/// Converted into a located [`ScampError`] at the node that failed with
/// [`RuntimeError::at`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// A call head that names neither a binding nor a primitive.
    #[error("'{0}' is not a defined function or primitive")]
    UndefinedTopLevelName(String),

    #[error("{callee} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        callee: String,
        expected: Arity,
        found: usize,
    },

    #[error("expected a function in call position, got {0}")]
    NotCallable(&'static str),

    #[error("expected a boolean guard, got {0}")]
    NonBooleanGuard(&'static str),

    #[error("'{form}' expects boolean operands, got {found}")]
    NonBooleanOperand {
        form: &'static str,
        found: &'static str,
    },

    #[error("no cond branch applies")]
    CondExhausted,

    #[error("{prim}: expected {expected}, got {found}")]
    PrimitiveType {
        prim: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}: division by zero")]
    DivisionByZero(String),

    #[error("evaluation did not finish within {0} steps")]
    StepLimitExceeded(u64),

    #[error("expression nests deeper than {0} levels")]
    DepthExceeded(usize),

    /// Caller contract violation: values never step.
    #[error("cannot step a {0}, it is already a value")]
    SteppedValue(&'static str),
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UndefinedVariable(_) => ErrorCode::UNDEFINED_VARIABLE,
            Self::UndefinedTopLevelName(_) => ErrorCode::UNDEFINED_TOP_LEVEL_NAME,
            Self::ArityMismatch { .. } => ErrorCode::ARITY_MISMATCH,
            Self::NotCallable(_) => ErrorCode::TYPE_EXPECTED_IN_CALL,
            Self::NonBooleanGuard(_) => ErrorCode::TYPE_EXPECTED_IN_GUARD,
            Self::NonBooleanOperand { .. } => ErrorCode::TYPE_EXPECTED_BOOLEAN_OPERAND,
            Self::CondExhausted => ErrorCode::COND_EXHAUSTED,
            Self::PrimitiveType { .. } => ErrorCode::PRIMITIVE_TYPE_MISMATCH,
            Self::DivisionByZero(_) => ErrorCode::DIVISION_BY_ZERO,
            Self::StepLimitExceeded(_) => ErrorCode::STEP_LIMIT_EXCEEDED,
            Self::DepthExceeded(_) => ErrorCode::RECURSION_DEPTH_EXCEEDED,
            Self::SteppedValue(_) => ErrorCode::INTERNAL_CONSISTENCY,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UndefinedVariable(_) => {
                Some("names become visible once the define that binds them has finished")
            }
            Self::UndefinedTopLevelName(_) => Some("check the spelling or define it first"),
            Self::NotCallable(_) => Some("only lambdas and primitives can be applied"),
            Self::CondExhausted => Some("add an [else ...] branch"),
            Self::StepLimitExceeded(_) => {
                Some("the program may not terminate; raise the step limit to keep going")
            }
            Self::DepthExceeded(_) => {
                Some("the recursion is too deep; an accumulator parameter keeps it flat")
            }
            _ => None,
        }
    }

    /// Locate this error at `expr`: its span, and its rendered text as
    /// the snippet.
    pub fn at(&self, expr: &Expr) -> ScampError {
        let error = ScampError::new(self.code(), self.to_string())
            .with_span(expr.span)
            .with_snippet(expr.to_string());
        match self.hint() {
            Some(hint) => error.with_hint(hint),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scamp_types::{Phase, Span};

    #[test]
    fn test_at_attaches_location_and_rendering() {
        let expr = Expr::new(scamp_types::ast::ExprKind::Var("y".into()), Span::new(3, 5, 3, 5));
        let err = RuntimeError::UndefinedVariable("y".into()).at(&expr);
        assert_eq!(err.phase, Phase::Runtime);
        assert_eq!(err.code, ErrorCode::UNDEFINED_VARIABLE);
        assert_eq!(err.message, "undefined variable 'y'");
        assert_eq!(err.span, Some(Span::new(3, 5, 3, 5)));
        assert_eq!(err.snippet.as_deref(), Some("y"));
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_arity_message() {
        let err = RuntimeError::ArityMismatch {
            callee: "f".into(),
            expected: Arity::Exact(2),
            found: 1,
        };
        assert_eq!(err.to_string(), "f expects exactly 2 argument(s), got 1");
        assert_eq!(err.code().ident(), "arity-mismatch");
    }

    #[test]
    fn test_depth_exceeded_code_and_hint() {
        let err = RuntimeError::DepthExceeded(10).at(&Expr::var("f"));
        assert_eq!(err.code, ErrorCode::RECURSION_DEPTH_EXCEEDED);
        assert_eq!(err.code.ident(), "recursion-depth-exceeded");
        assert_eq!(err.message, "expression nests deeper than 10 levels");
        assert!(err.hint.as_deref().is_some_and(|h| h.contains("accumulator")));
    }

    #[test]
    fn test_synthetic_node_has_no_span() {
        let err = RuntimeError::CondExhausted.at(&Expr::cond(Vec::<(Expr, Expr)>::new()));
        assert_eq!(err.span, None);
        assert_eq!(err.snippet.as_deref(), Some("(cond)"));
    }
}
