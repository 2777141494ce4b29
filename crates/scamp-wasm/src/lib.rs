//! Scamp stepper as a WASM module for browser environments.
//!
//! The debugger front end drives a [`Stepper`] one micro-step at a time
//! and renders the JSON snapshot it returns after every move.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { Stepper } from 'scamp-wasm';
//!
//! await init();
//!
//! const stepper = new Stepper("(define x 1) (+ x 2)", "main.scm");
//! stepper.step_forward();
//! console.log(JSON.parse(stepper.snapshot()));
//! // { step: 2, recorded_states: 2, finished: false, statements: [...], ... }
//! ```

use scamp_compiler::{compile_appended, compile_source};
use scamp_eval::{ProgramTrace, StateSnapshot};
use scamp_types::ast::Program;
use scamp_types::{CompileErrors, ErrorCode, ScampError, SourceFile};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
struct CheckResult<'a> {
    success: bool,
    errors: &'a CompileErrors,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        let err = ScampError::new(
            ErrorCode::INTERNAL_CONSISTENCY,
            format!("serialization error: {e}"),
        );
        let mut errors = CompileErrors::empty();
        errors.push_error(err);
        format!(
            r#"{{"success":false,"errors":{}}}"#,
            serde_json::to_string(&errors).unwrap_or_else(|_| "null".to_string())
        )
    })
}

fn check_result(errors: &CompileErrors) -> String {
    to_json(&CheckResult {
        success: !errors.has_errors(),
        errors,
    })
}

/// Parse and scope-check a program without running it.
///
/// Returns `{ "success": bool, "errors": { "errors": [...], "total_errors": n } }`.
#[wasm_bindgen]
pub fn check(source: &str, filename: &str) -> String {
    let errors = match compile_source(&SourceFile::new(filename, source)) {
        Ok(_) => CompileErrors::empty(),
        Err(errors) => errors,
    };
    check_result(&errors)
}

/// Return the crate version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A time-travel session over one program.
///
/// A program that fails to compile gives an empty session; its diagnostics
/// are available from [`Stepper::diagnostics`].
#[wasm_bindgen]
pub struct Stepper {
    trace: ProgramTrace,
    diagnostics: CompileErrors,
}

#[wasm_bindgen]
impl Stepper {
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, filename: &str) -> Stepper {
        let (program, diagnostics) = match compile_source(&SourceFile::new(filename, source)) {
            Ok(program) => (program, CompileErrors::empty()),
            Err(errors) => (Program::default(), errors),
        };
        Stepper {
            trace: ProgramTrace::from_program(program),
            diagnostics,
        }
    }

    /// Compile diagnostics for the constructor's source, in the shape of [`check`].
    pub fn diagnostics(&self) -> String {
        check_result(&self.diagnostics)
    }

    pub fn step_forward(&mut self) {
        self.trace.step_forward();
    }

    pub fn step_backward(&mut self) {
        self.trace.step_backward();
    }

    pub fn eval_next_stmt(&mut self) {
        self.trace.eval_next_stmt();
    }

    pub fn revert_prev_stmt(&mut self) {
        self.trace.revert_prev_stmt();
    }

    pub fn evaluate_prog(&mut self) {
        self.trace.evaluate_prog();
    }

    pub fn reset(&mut self) {
        self.trace.reset_prog();
    }

    /// Compile `source` against the program so far and append its statements.
    ///
    /// Nothing is appended unless every statement compiles.
    pub fn add_statement(&mut self, source: &str) -> String {
        let compiled = {
            let state = self.trace.current_state();
            compile_appended(state.program(), state.env(), source)
        };
        match compiled {
            Ok(stmts) => {
                for stmt in stmts {
                    self.trace.add_stmt(stmt);
                }
                check_result(&CompileErrors::empty())
            }
            Err(errors) => check_result(&errors),
        }
    }

    pub fn at_start(&self) -> bool {
        self.trace.pos() == 0
    }

    pub fn at_frontier(&self) -> bool {
        self.trace.at_frontier()
    }

    pub fn is_finished(&self) -> bool {
        self.trace.current_state().is_fully_evaluated()
    }

    /// The current trace position as JSON.
    pub fn snapshot(&self) -> String {
        to_json(&StateSnapshot::capture(&self.trace))
    }

    /// The current program as source text.
    pub fn render(&self) -> String {
        self.trace.current_state().program().to_string()
    }
}
