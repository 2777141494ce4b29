//! Scamp small-step evaluator.
//!
//! Reduces one redex at a time so every intermediate program can be shown,
//! then records the resulting states in a [`ProgramTrace`] that can be
//! walked forward and backward without recomputation.
//!
//! Layers, leaf first:
//! - [`Environment`]: immutable name → value map, extended by copy.
//! - [`subst`]: substitution of values for free names.
//! - [`stepper`]: the single-step reduction relation over expressions.
//! - [`prims`]: built-in primitive operations.
//! - [`stmt`]: lifting a step to one program statement.
//! - [`ProgramState`]: a program paired with its environment.
//! - [`ProgramTrace`]: recorded history with a cursor.

pub mod env;
pub mod error;
pub mod prims;
pub mod snapshot;
pub mod state;
pub mod stepper;
pub mod stmt;
pub mod subst;
pub mod trace;

pub use env::Environment;
pub use error::RuntimeError;
pub use snapshot::StateSnapshot;
pub use state::ProgramState;
pub use stepper::{evaluate, evaluate_with_gas, step, Gas, MAX_STEP_DEPTH};
pub use stmt::step_stmt;
pub use trace::ProgramTrace;
