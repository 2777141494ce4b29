//! Scamp front end: turns source text into something the stepper can run.
//!
//! ```text
//! Source → Lexer → Parser → Scope Checker → Program / Expr
//! ```
//!
//! Every stage collects diagnostics instead of stopping at the first one;
//! a pipeline call fails with all of them.

pub mod env;
pub mod scope;

pub use scope::{scope_check_appended, scope_check_expression, scope_check_program, ScopeChecker};

use scamp_eval::Environment;
use scamp_lexer::Lexer;
use scamp_parser::Parser;
use scamp_types::ast::{Expr, Program, Stmt};
use scamp_types::{CompileErrors, SourceFile};
use tracing::debug;

/// Name given to source text that did not come from a file.
pub const INPUT_NAME: &str = "<input>";

/// Lex and parse a program. Lexer and parser errors are reported together.
pub fn parse_program(source: &SourceFile) -> Result<Program, CompileErrors> {
    let lexed = Lexer::new(source).lex();
    let mut errors = lexed.errors;
    let parsed = Parser::new(lexed.tokens, source).parse();
    errors.extend(parsed.errors);
    match parsed.program {
        Some(program) if !errors.has_errors() => Ok(program),
        _ => Err(errors),
    }
}

/// Lex and parse exactly one expression.
pub fn parse_expression(source: &SourceFile) -> Result<Expr, CompileErrors> {
    let lexed = Lexer::new(source).lex();
    let mut errors = lexed.errors;
    let parsed = Parser::new(lexed.tokens, source).parse_expression_only();
    errors.extend(parsed.errors);
    match parsed.expr {
        Some(expr) if !errors.has_errors() => Ok(expr),
        _ => Err(errors),
    }
}

/// Parse and scope-check a program read from `source`.
pub fn compile_source(source: &SourceFile) -> Result<Program, CompileErrors> {
    let program = parse_program(source)?;
    let errors = scope_check_program(&program, source);
    debug!(
        target: "scamp::compiler",
        file = %source.name,
        statements = program.len(),
        errors = errors.total_errors,
        "compiled program"
    );
    errors.into_result(program)
}

/// Parse and scope-check program text.
pub fn compile_program(src: &str) -> Result<Program, CompileErrors> {
    compile_source(&SourceFile::new(INPUT_NAME, src))
}

/// Parse and scope-check an expression to run in `env`.
pub fn compile_expr(env: &Environment, src: &str) -> Result<Expr, CompileErrors> {
    let source = SourceFile::new(INPUT_NAME, src);
    let expr = parse_expression(&source)?;
    scope_check_expression(env, &expr, &source).into_result(expr)
}

/// Parse and scope-check statements to append to a running program.
///
/// Names defined by `existing` or bound in `env` are in scope.
pub fn compile_appended(
    existing: &Program,
    env: &Environment,
    src: &str,
) -> Result<Vec<Stmt>, CompileErrors> {
    let source = SourceFile::new(INPUT_NAME, src);
    let program = parse_program(&source)?;
    let stmts = program.into_stmts();
    scope_check_appended(existing, env, &stmts, &source).into_result(stmts)
}
