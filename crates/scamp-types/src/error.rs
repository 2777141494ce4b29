use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before the rest are only counted.
pub const MAX_ERRORS: usize = 20;

/// The stage of the pipeline that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Parse,
    Scope,
    Runtime,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "Parse error"),
            Self::Scope => write!(f, "Scope error"),
            Self::Runtime => write!(f, "Runtime error"),
        }
    }
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Parse errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const INVALID_LITERAL: Self = Self(103);
    pub const MALFORMED_FORM: Self = Self(104);
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(105);
    pub const DEFINE_NOT_AT_TOP_LEVEL: Self = Self(106);
    pub const BLOCK_COMMENT_USED: Self = Self(107);

    // ── Scope errors (E200–E299) ──
    pub const UNBOUND_NAME: Self = Self(200);
    pub const DUPLICATE_PARAMETER: Self = Self(201);
    pub const DUPLICATE_DEFINE: Self = Self(202);

    // ── Runtime errors (E300–E399) ──
    pub const UNDEFINED_VARIABLE: Self = Self(300);
    pub const UNDEFINED_TOP_LEVEL_NAME: Self = Self(301);
    pub const ARITY_MISMATCH: Self = Self(302);
    pub const TYPE_EXPECTED_IN_CALL: Self = Self(303);
    pub const TYPE_EXPECTED_IN_GUARD: Self = Self(304);
    pub const TYPE_EXPECTED_BOOLEAN_OPERAND: Self = Self(305);
    pub const COND_EXHAUSTED: Self = Self(306);
    pub const PRIMITIVE_TYPE_MISMATCH: Self = Self(307);
    pub const DIVISION_BY_ZERO: Self = Self(308);
    pub const STEP_LIMIT_EXCEEDED: Self = Self(309);
    pub const RECURSION_DEPTH_EXCEEDED: Self = Self(310);

    // ── File & internal errors (E400–E499) ──
    pub const FILE_NOT_FOUND: Self = Self(400);
    pub const FETCH_FAILED: Self = Self(401);
    pub const UNSUPPORTED_OPERATION: Self = Self(402);
    pub const INTERNAL_CONSISTENCY: Self = Self(499);

    /// Get the phase for this error code.
    pub fn phase(self) -> Phase {
        match self.0 {
            100..=199 => Phase::Parse,
            200..=299 => Phase::Scope,
            _ => Phase::Runtime,
        }
    }

    /// The stable kebab-case identifier of this code, e.g. `undefined-variable`.
    pub fn ident(self) -> &'static str {
        match self {
            Self::UNEXPECTED_TOKEN => "unexpected-token",
            Self::UNCLOSED_DELIMITER => "unclosed-delimiter",
            Self::UNTERMINATED_STRING => "unterminated-string",
            Self::INVALID_LITERAL => "invalid-literal",
            Self::MALFORMED_FORM => "malformed-form",
            Self::NESTING_LIMIT_EXCEEDED => "nesting-limit-exceeded",
            Self::DEFINE_NOT_AT_TOP_LEVEL => "define-not-at-top-level",
            Self::BLOCK_COMMENT_USED => "block-comment-used",
            Self::UNBOUND_NAME => "unbound-name",
            Self::DUPLICATE_PARAMETER => "duplicate-parameter",
            Self::DUPLICATE_DEFINE => "duplicate-define",
            Self::UNDEFINED_VARIABLE => "undefined-variable",
            Self::UNDEFINED_TOP_LEVEL_NAME => "undefined-top-level-name",
            Self::ARITY_MISMATCH => "arity-mismatch",
            Self::TYPE_EXPECTED_IN_CALL => "type-expected-in-call-position",
            Self::TYPE_EXPECTED_IN_GUARD => "type-expected-in-conditional-guard",
            Self::TYPE_EXPECTED_BOOLEAN_OPERAND => "type-expected-boolean-operand",
            Self::COND_EXHAUSTED => "cond-exhausted",
            Self::PRIMITIVE_TYPE_MISMATCH => "primitive-type-mismatch",
            Self::DIVISION_BY_ZERO => "division-by-zero",
            Self::STEP_LIMIT_EXCEEDED => "step-limit-exceeded",
            Self::RECURSION_DEPTH_EXCEEDED => "recursion-depth-exceeded",
            Self::FILE_NOT_FOUND => "file-not-found",
            Self::FETCH_FAILED => "fetch-failed",
            Self::UNSUPPORTED_OPERATION => "unsupported-operation",
            Self::INTERNAL_CONSISTENCY => "internal-consistency-error",
            _ => "unknown-error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured Scamp error: the failure half of every fallible operation.
///
/// Front-ends render these from their fields; they must not parse the
/// `Display` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScampError {
    /// Pipeline phase (derived from code).
    pub phase: Phase,
    /// Error code (e.g., E300).
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Source location, when the failing node came from parsed text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span: Option<Span>,
    /// The offending source line or the rendered failing expression.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snippet: Option<String>,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hint: Option<String>,
}

impl ScampError {
    /// Create a new error with no location attached.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            phase: code.phase(),
            code,
            message: message.into(),
            span: None,
            snippet: None,
            hint: None,
        }
    }

    /// Attach a source location (a `None` span leaves the error unlocated).
    pub fn with_span(mut self, span: impl Into<Option<Span>>) -> Self {
        self.span = span.into();
        self
    }

    /// Attach the rendered source the error refers to.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Attach a fix suggestion.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Shorthand for an internal-consistency failure.
    pub fn internal(location: &str, message: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::INTERNAL_CONSISTENCY,
            format!("internal error in {location}: {message}"),
        )
    }
}

impl fmt::Display for ScampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.phase, self.code)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ScampError {}

/// Diagnostics collected by a batch stage (lexer, parser, scope checker).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<ScampError>,
    pub total_errors: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: ScampError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Move every error of `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
    }

    /// The first recorded error, if any.
    pub fn first(&self) -> Option<&ScampError> {
        self.errors.first()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, CompileErrors> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        let hidden = self.total_errors - self.errors.len();
        if hidden > 0 {
            write!(f, "\n... and {hidden} more")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}
