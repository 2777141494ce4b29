//! Scamp parser: converts a token stream into a [`Program`] or a single
//! [`Expr`].
//!
//! [`Program`]: scamp_types::ast::Program
//! [`Expr`]: scamp_types::ast::Expr

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ExprParseResult, ParseResult, Parser, MAX_NESTING_DEPTH};
