//! A whole program paired with its environment.

use scamp_types::ast::{Expr, Program};
use scamp_types::Result;
use std::fmt;
use tracing::debug;

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::stepper;
use crate::stmt::{pending_expr, step_stmt};

/// One immutable point in a program's execution.
///
/// The environment holds exactly the names of the completed defines seen
/// so far, in program order. Every operation returns a new state; the
/// receiver is never modified. A stepped state shares its environment and
/// every statement it did not change with the state it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramState {
    env: Environment,
    program: Program,
}

impl ProgramState {
    /// A state with an empty environment.
    pub fn new(program: Program) -> Self {
        Self::with_env(program, Environment::new())
    }

    pub fn with_env(program: Program, env: Environment) -> Self {
        Self { env, program }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// True when every statement is terminal.
    pub fn is_fully_evaluated(&self) -> bool {
        self.program.is_fully_evaluated()
    }

    /// Index of the statement the next step will advance.
    pub fn current_stmt_index(&self) -> Option<usize> {
        self.program.index_of_current_stmt()
    }

    /// Step the left-most unfinished statement once.
    ///
    /// A fully evaluated state steps to an identical copy of itself.
    pub fn step(&self) -> ProgramState {
        let Some(index) = self.current_stmt_index() else {
            return self.clone();
        };
        let (env, stmt) = step_stmt(&self.env, &self.program[index]);
        if stmt.is_done() {
            debug!(
                target: "scamp::eval::state",
                index,
                kind = stmt.kind_name(),
                "statement finished"
            );
        }
        ProgramState {
            env,
            program: self.program.with_stmt(index, stmt),
        }
    }

    /// Step until every statement is terminal. Unbounded.
    pub fn evaluate(&self) -> ProgramState {
        let mut state = self.clone();
        while !state.is_fully_evaluated() {
            state = state.step();
        }
        state
    }

    /// Step until every statement is terminal, taking at most `limit`
    /// steps. Fails with `step-limit-exceeded` located at the statement
    /// still being reduced.
    pub fn evaluate_with_gas(&self, limit: u64) -> Result<ProgramState> {
        let mut gas = stepper::Gas::new(limit);
        let mut state = self.clone();
        while !state.is_fully_evaluated() {
            gas.tick().map_err(|err| state.locate(err))?;
            state = state.step();
        }
        Ok(state)
    }

    /// Step an ad-hoc expression once in this state's environment.
    pub fn step_expr(&self, expr: &Expr) -> Result<Expr> {
        stepper::step(&self.env, expr)
    }

    /// Evaluate an ad-hoc expression in this state's environment.
    pub fn evaluate_expr(&self, expr: &Expr) -> Result<Expr> {
        stepper::evaluate(&self.env, expr)
    }

    pub fn evaluate_expr_with_gas(&self, expr: &Expr, limit: u64) -> Result<Expr> {
        stepper::evaluate_with_gas(&self.env, expr, limit)
    }

    /// Attach `err` to the statement currently being reduced.
    pub(crate) fn locate(&self, err: RuntimeError) -> scamp_types::ScampError {
        match self
            .current_stmt_index()
            .and_then(|i| self.program.get(i))
            .and_then(pending_expr)
        {
            Some(expr) => err.at(expr),
            None => scamp_types::ScampError::new(err.code(), err.to_string()),
        }
    }
}

impl From<Program> for ProgramState {
    fn from(program: Program) -> Self {
        ProgramState::new(program)
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)
    }
}
