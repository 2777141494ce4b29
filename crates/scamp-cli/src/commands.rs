//! Subcommand bodies.

use anyhow::{bail, Result};
use scamp_compiler::compile_source;
use scamp_eval::{ProgramState, ProgramTrace, StateSnapshot};
use scamp_types::ast::{Program, Stmt};
use scamp_types::SourceFile;
use tracing::info;

use crate::report::{format_error, print_errors};

pub struct Options {
    pub max_steps: u64,
    pub json: bool,
}

fn compile(source: &SourceFile, options: &Options) -> Result<Program> {
    match compile_source(source) {
        Ok(program) => Ok(program),
        Err(errors) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                print_errors(&source.name, &errors);
            }
            bail!("{} failed to compile with {} error(s)", source.name, errors.total_errors)
        }
    }
}

fn runtime_errors(program: &Program) -> usize {
    program
        .iter()
        .filter(|s| matches!(s, Stmt::Error(_)))
        .count()
}

fn print_state(file: &str, state: &ProgramState) {
    for stmt in state.program().iter() {
        match stmt {
            Stmt::Error(err) => eprintln!("{}", format_error(file, err)),
            _ => println!("{stmt}"),
        }
    }
}

pub fn run(source: &SourceFile, options: &Options) -> Result<()> {
    let program = compile(source, options)?;
    // Only the final state is kept.
    let state = ProgramState::new(program).evaluate_with_gas(options.max_steps)?;
    info!(statements = state.program().len(), "evaluation finished");

    if options.json {
        println!("{}", StateSnapshot::of_state(&state, 1, 1).to_json()?);
    } else {
        print_state(&source.name, &state);
        if !state.env().is_empty() {
            println!();
            for (name, value) in state.env().iter() {
                println!("{name} = {value}");
            }
        }
    }

    let failed = runtime_errors(state.program());
    if failed > 0 {
        bail!("{failed} statement(s) stopped with a runtime error");
    }
    Ok(())
}

pub fn trace(source: &SourceFile, options: &Options) -> Result<()> {
    let program = compile(source, options)?;
    let mut trace = ProgramTrace::from_program(program);
    let mut steps = 0u64;
    loop {
        if options.json {
            println!("{}", serde_json::to_string(&StateSnapshot::capture(&trace))?);
        } else {
            println!("── step {} ──", trace.current_step());
            print_state(&source.name, &trace.current_state());
        }
        if trace.current_state().is_fully_evaluated() {
            break;
        }
        if steps == options.max_steps {
            bail!("stopped after {steps} steps");
        }
        trace.step_forward();
        steps += 1;
    }
    Ok(())
}

pub fn check(source: &SourceFile, options: &Options) -> Result<()> {
    let program = compile(source, options)?;
    if options.json {
        println!(r#"{{"errors":[],"total_errors":0}}"#);
    } else {
        println!("{}: {} statement(s), no errors", source.name, program.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Options {
        Options {
            max_steps: 1000,
            json: false,
        }
    }

    fn source(text: &str) -> SourceFile {
        SourceFile::new("test.scm", text)
    }

    #[test]
    fn test_run_ok() {
        assert!(run(&source("(define x 2) (* x x)"), &options()).is_ok());
    }

    #[test]
    fn test_run_reports_runtime_error() {
        let err = run(&source("(car 1)"), &options()).unwrap_err();
        assert!(err.to_string().contains("runtime error"));
    }

    #[test]
    fn test_run_respects_step_limit() {
        let src = "(define loop (lambda (n) (loop n))) (loop 1)";
        let err = run(&source(src), &options()).unwrap_err();
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_check_compile_error() {
        let err = check(&source("(+ y 1)"), &options()).unwrap_err();
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn test_trace_ok() {
        assert!(trace(&source("(+ 1 (* 2 3))"), &options()).is_ok());
    }
}
