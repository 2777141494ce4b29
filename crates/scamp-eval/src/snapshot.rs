//! Serialisable views of a trace position, for debugger front-ends.

use scamp_types::ast::Stmt;
use scamp_types::ScampError;
use serde::{Deserialize, Serialize};

use crate::state::ProgramState;
use crate::trace::ProgramTrace;

/// One statement as a front-end shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtSnapshot {
    /// `expression`, `value`, `define`, `binding` or `error`.
    pub kind: String,
    /// Rendered source text.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ScampError>,
}

/// One environment binding, rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSnapshot {
    pub name: String,
    pub value: String,
}

/// Everything needed to draw one position of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// 1-based cursor position.
    pub step: usize,
    pub recorded_states: usize,
    pub finished: bool,
    /// Index of the statement the next step advances.
    pub current_statement: Option<usize>,
    pub statements: Vec<StmtSnapshot>,
    pub environment: Vec<BindingSnapshot>,
}

impl StateSnapshot {
    /// Capture the cursor position of `trace`.
    pub fn capture(trace: &ProgramTrace) -> Self {
        Self::of_state(&trace.current_state(), trace.current_step(), trace.len())
    }

    /// Capture `state` as step `step` of `recorded_states`.
    pub fn of_state(state: &ProgramState, step: usize, recorded_states: usize) -> Self {
        let statements = state
            .program()
            .iter()
            .map(|stmt| StmtSnapshot {
                kind: stmt.kind_name().to_string(),
                text: stmt.to_string(),
                error: match stmt {
                    Stmt::Error(err) => Some(err.clone()),
                    _ => None,
                },
            })
            .collect();
        let environment = state
            .env()
            .iter()
            .map(|(name, value)| BindingSnapshot {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect();
        Self {
            step,
            recorded_states,
            finished: state.is_fully_evaluated(),
            current_statement: state.current_stmt_index(),
            statements,
            environment,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
