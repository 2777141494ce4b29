//! Shared types for the Scamp stepper.
//!
//! This crate defines the expression and statement tree, source spans,
//! the structured error record every fallible stage returns, and the
//! rendering of trees back to source text.

mod error;
mod render;
mod span;
pub mod ast;

pub use error::{CompileErrors, ErrorCode, Phase, ScampError, MAX_ERRORS};
pub use render::format_number;
pub use span::{SourceFile, Span};

/// Result type used throughout Scamp.
pub type Result<T> = std::result::Result<T, ScampError>;
