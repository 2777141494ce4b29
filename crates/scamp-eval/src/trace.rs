//! Recorded execution history with a movable cursor.
//!
//! A [`ProgramTrace`] keeps every [`ProgramState`] it has computed. Moving
//! backward only moves the cursor; moving forward replays recorded states
//! until the cursor reaches the frontier (the newest state), and only
//! there is a new state computed. Because stepping is pure, replayed
//! states are exactly what recomputation would produce.
//!
//! Statements added with [`ProgramTrace::add_stmt`] go into an append log
//! shared by the whole history. A recorded state that predates some
//! appended statements is viewed with those statements added at its end,
//! still pending; the recorded state itself is never rewritten.

use scamp_types::ast::{Program, Stmt};
use scamp_types::Result;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::snapshot::StateSnapshot;
use crate::state::ProgramState;
use crate::stepper::Gas;

#[derive(Debug, Clone)]
pub struct ProgramTrace {
    /// Recorded states; never empty, only grows at the end.
    states: Vec<Arc<ProgramState>>,
    /// Cursor into `states`.
    pos: usize,
    /// Statement count of the initial program.
    base_len: usize,
    /// Statements added after recording started.
    appended: Vec<Stmt>,
}

impl ProgramTrace {
    /// Start a history at `initial`.
    pub fn new(initial: ProgramState) -> Self {
        Self {
            base_len: initial.program().len(),
            states: vec![Arc::new(initial)],
            pos: 0,
            appended: Vec::new(),
        }
    }

    /// Start a history at `program` with an empty environment.
    pub fn from_program(program: Program) -> Self {
        Self::new(ProgramState::new(program))
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a trace holds at least its initial state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Cursor position, 0-based.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Cursor position, 1-based, for display.
    pub fn current_step(&self) -> usize {
        self.pos + 1
    }

    /// True when the cursor is on the newest recorded state.
    pub fn at_frontier(&self) -> bool {
        self.pos + 1 == self.states.len()
    }

    /// The state under the cursor, including appended statements.
    pub fn current_state(&self) -> Cow<'_, ProgramState> {
        self.view(self.pos)
    }

    /// The recorded state `i`, including appended statements.
    pub fn state_at(&self, i: usize) -> Option<Cow<'_, ProgramState>> {
        (i < self.states.len()).then(|| self.view(i))
    }

    /// The shared handle of the state under the cursor, as recorded.
    pub fn current_handle(&self) -> &Arc<ProgramState> {
        &self.states[self.pos]
    }

    /// Statements added with [`add_stmt`](Self::add_stmt), in order.
    pub fn appended(&self) -> &[Stmt] {
        &self.appended
    }

    fn view(&self, i: usize) -> Cow<'_, ProgramState> {
        let state = &self.states[i];
        let seen = state.program().len().saturating_sub(self.base_len);
        if seen >= self.appended.len() {
            return Cow::Borrowed(state.as_ref());
        }
        let mut program = state.program().clone();
        program.extend(self.appended[seen..].iter().cloned());
        Cow::Owned(ProgramState::with_env(program, state.env().clone()))
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    /// Move one step forward.
    ///
    /// Behind the frontier this only moves the cursor. At the frontier it
    /// computes and records the next state, unless the program is already
    /// fully evaluated, in which case nothing happens.
    pub fn step_forward(&mut self) {
        let last = self.states.len() - 1;
        if self.pos < last {
            self.pos += 1;
            trace!(target: "scamp::eval::trace", pos = self.pos, "replayed recorded state");
            return;
        }
        let next = {
            let frontier = self.view(last);
            if frontier.is_fully_evaluated() {
                return;
            }
            frontier.step()
        };
        self.states.push(Arc::new(next));
        self.pos += 1;
        debug!(
            target: "scamp::eval::trace",
            recorded = self.states.len(),
            "recorded new frontier state"
        );
    }

    /// Move one step backward; never recomputes or discards history.
    pub fn step_backward(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
            trace!(target: "scamp::eval::trace", pos = self.pos, "moved back");
        }
    }

    /// Step forward until the current statement finishes and another one
    /// (or nothing) becomes current.
    pub fn eval_next_stmt(&mut self) {
        let current = self.current_state().current_stmt_index();
        if current.is_none() {
            return;
        }
        while self.current_state().current_stmt_index() == current {
            self.step_forward();
        }
    }

    /// Step backward until a different statement is current, or the
    /// start of the history is reached.
    pub fn revert_prev_stmt(&mut self) {
        let current = self.current_state().current_stmt_index();
        while self.pos > 0 && self.current_state().current_stmt_index() == current {
            self.step_backward();
        }
    }

    /// Step forward until the program is fully evaluated, recording every
    /// intermediate state. Unbounded.
    pub fn evaluate_prog(&mut self) {
        while !self.current_state().is_fully_evaluated() {
            self.step_forward();
        }
    }

    /// Like [`evaluate_prog`](Self::evaluate_prog) but moves forward at most
    /// `limit` times. On failure the cursor stays where it stopped and the
    /// history is kept.
    pub fn evaluate_prog_with_gas(&mut self, limit: u64) -> Result<()> {
        let mut gas = Gas::new(limit);
        while !self.current_state().is_fully_evaluated() {
            if let Err(err) = gas.tick() {
                return Err(self.current_state().locate(err));
            }
            self.step_forward();
        }
        Ok(())
    }

    /// Move the cursor back to the initial state. History is kept.
    pub fn reset_prog(&mut self) {
        self.pos = 0;
    }

    /// Append `stmt` to the program as seen from every recorded state.
    pub fn add_stmt(&mut self, stmt: Stmt) {
        debug!(
            target: "scamp::eval::trace",
            kind = stmt.kind_name(),
            "appended statement"
        );
        self.appended.push(stmt);
    }

    /// A serialisable view of the cursor position.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(self)
    }
}

impl From<Program> for ProgramTrace {
    fn from(program: Program) -> Self {
        ProgramTrace::from_program(program)
    }
}
