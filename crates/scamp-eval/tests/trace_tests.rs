//! ProgramTrace navigation: recording, replay, statement stepping, appends.

use scamp_eval::{ProgramState, ProgramTrace};
use scamp_lexer::Lexer;
use scamp_parser::Parser;
use scamp_types::ast::*;
use scamp_types::{ErrorCode, SourceFile};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn program(source: &str) -> Program {
    let sf = SourceFile::new("test.scm", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf)
        .parse()
        .program
        .expect("program should parse")
}

fn trace(source: &str) -> ProgramTrace {
    ProgramTrace::from_program(program(source))
}

/// Five micro-steps: publish `x`, three reductions of the sum, then
/// mark it done.
const SMALL: &str = "(define x 1)\n(+ x (* 1 2))";

// ─────────────────────────────────────────────────────────────────────
// Recording
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_new_trace_has_one_state() {
    let t = trace(SMALL);
    assert_eq!(t.len(), 1);
    assert!(!t.is_empty());
    assert_eq!(t.pos(), 0);
    assert_eq!(t.current_step(), 1);
    assert!(t.at_frontier());
}

#[test]
fn test_step_forward_records_at_frontier() {
    let mut t = trace(SMALL);
    t.step_forward();
    assert_eq!(t.len(), 2);
    assert_eq!(t.pos(), 1);
    assert_eq!(t.current_state().env().get("x"), Some(&Expr::number(1.0)));
}

#[test]
fn test_step_forward_at_finished_frontier_is_noop() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    let len = t.len();
    let pos = t.pos();
    t.step_forward();
    assert_eq!((t.len(), t.pos()), (len, pos));
}

#[test]
fn test_evaluate_prog_keeps_every_state() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    // initial, x published, x substituted, (* 1 2) reduced, sum, done
    assert_eq!(t.len(), 6);
    let last = t.current_state();
    assert!(last.is_fully_evaluated());
    assert_eq!(last.program()[1], Stmt::ExprDone(Expr::number(3.0)));
    for i in 0..t.len() {
        assert!(t.state_at(i).is_some());
    }
    assert!(t.state_at(t.len()).is_none());
}

#[test]
fn test_end_to_end_final_environment() {
    let mut t = trace("(define x 1)\n(+ x 2)");
    t.evaluate_prog();
    let state = t.current_state();
    assert_eq!(state.env().names().collect::<Vec<_>>(), vec!["x"]);
    assert_eq!(state.env().get("x"), Some(&Expr::number(1.0)));
    assert_eq!(state.program()[1], Stmt::ExprDone(Expr::number(3.0)));
}

// ─────────────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_backward_then_forward_replays_same_object() {
    let mut t = trace(SMALL);
    t.step_forward();
    t.step_forward();
    t.step_forward();
    t.step_backward();
    let before = Arc::clone(t.current_handle());
    let pos = t.pos();
    let len = t.len();

    t.step_backward();
    t.step_forward();

    assert_eq!(t.pos(), pos);
    assert!(Arc::ptr_eq(t.current_handle(), &before));
    assert_eq!(t.len(), len, "replay must not record new states");
}

#[test]
fn test_step_backward_at_start_is_noop() {
    let mut t = trace(SMALL);
    t.step_backward();
    assert_eq!(t.pos(), 0);
}

#[test]
fn test_reset_keeps_history() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    let len = t.len();
    t.reset_prog();
    assert_eq!(t.pos(), 0);
    assert_eq!(t.len(), len);
    t.step_forward();
    assert_eq!(t.len(), len);
}

#[test]
fn test_replayed_states_match_recomputation() {
    let mut t = trace("(define (sq n) (* n n))\n(sq (sq 2))");
    t.evaluate_prog();
    for i in 1..t.len() {
        let prev = t.state_at(i - 1).unwrap().into_owned();
        let recorded = t.state_at(i).unwrap().into_owned();
        assert_eq!(prev.step(), recorded);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statement stepping
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_eval_next_stmt_steps_over_one_statement() {
    let mut t = trace("(define a (+ 1 2))\n(define b (* a 2))\n(+ a b)");
    assert_eq!(t.current_state().current_stmt_index(), Some(0));

    t.eval_next_stmt();
    assert_eq!(t.current_state().current_stmt_index(), Some(1));
    assert_eq!(t.current_state().env().get("a"), Some(&Expr::number(3.0)));

    t.eval_next_stmt();
    assert_eq!(t.current_state().current_stmt_index(), Some(2));

    t.eval_next_stmt();
    assert!(t.current_state().is_fully_evaluated());
    assert_eq!(
        t.current_state().program()[2],
        Stmt::ExprDone(Expr::number(9.0))
    );

    let len = t.len();
    t.eval_next_stmt();
    assert_eq!(t.len(), len);
}

#[test]
fn test_revert_prev_stmt_mirrors_eval_next_stmt() {
    let mut t = trace("(define a (+ 1 2))\n(define b (* a 2))");
    t.eval_next_stmt();
    t.eval_next_stmt();
    assert!(t.current_state().is_fully_evaluated());

    t.revert_prev_stmt();
    assert_eq!(t.current_state().current_stmt_index(), Some(1));

    t.revert_prev_stmt();
    assert_eq!(t.current_state().current_stmt_index(), Some(0));

    t.revert_prev_stmt();
    assert_eq!(t.pos(), 0);
}

#[test]
fn test_errors_do_not_stop_later_statements() {
    let mut t = trace("(define x undefined_name)\n5");
    t.evaluate_prog();
    let state = t.current_state();
    assert!(matches!(&state.program()[0], Stmt::Error(e) if e.code == ErrorCode::UNDEFINED_VARIABLE));
    assert_eq!(state.program()[1], Stmt::ExprDone(Expr::number(5.0)));
}

#[test]
fn test_evaluate_prog_with_gas() {
    let mut t = trace("(define (spin) (spin))\n(spin)\n1");
    let err = t.evaluate_prog_with_gas(25).unwrap_err();
    assert_eq!(err.code, ErrorCode::STEP_LIMIT_EXCEEDED);
    assert_eq!(t.len(), 26);
    assert_eq!(t.current_state().current_stmt_index(), Some(1));

    let mut ok = trace(SMALL);
    assert!(ok.evaluate_prog_with_gas(1_000).is_ok());
    assert!(ok.current_state().is_fully_evaluated());
}

// ─────────────────────────────────────────────────────────────────────
// Appending statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_add_stmt_visible_from_every_state() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    let len = t.len();
    t.add_stmt(Stmt::expr(Expr::call(
        Expr::var("*"),
        vec![Expr::var("x"), Expr::number(10.0)],
    )));

    for i in 0..len {
        let state = t.state_at(i).unwrap();
        assert_eq!(state.program().len(), 3);
        assert!(matches!(state.program()[2], Stmt::ExprPending(_)));
    }
    assert_eq!(t.len(), len, "appending records nothing");
    assert!(!t.current_state().is_fully_evaluated());
}

#[test]
fn test_add_stmt_resumes_evaluation() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    t.add_stmt(Stmt::define("y", Expr::call(
        Expr::var("+"),
        vec![Expr::var("x"), Expr::number(1.0)],
    )));
    t.evaluate_prog();
    let state = t.current_state();
    assert!(state.is_fully_evaluated());
    assert_eq!(state.env().get("y"), Some(&Expr::number(2.0)));
    assert_eq!(t.appended().len(), 1);
}

#[test]
fn test_add_stmt_then_replay_from_start() {
    let mut t = trace(SMALL);
    t.evaluate_prog();
    t.add_stmt(Stmt::expr(Expr::number(7.0)));
    t.reset_prog();
    t.evaluate_prog();
    let state = t.current_state();
    assert_eq!(state.program()[2], Stmt::ExprDone(Expr::number(7.0)));
}

#[test]
fn test_trace_from_initial_environment() {
    let env = scamp_eval::Environment::new().extend("k", Expr::number(4.0));
    let mut t = ProgramTrace::new(ProgramState::with_env(program("(* k k)"), env));
    t.evaluate_prog();
    assert_eq!(
        t.current_state().program()[0],
        Stmt::ExprDone(Expr::number(16.0))
    );
}

#[test]
fn test_navigation_deterministic() {
    let run = || {
        let mut t = trace("(define (f n) (if (= n 0) 0 (f (- n 1))))\n(f 3)");
        t.evaluate_prog();
        t.revert_prev_stmt();
        t.step_backward();
        (t.pos(), t.len(), t.current_state().into_owned())
    };
    let first = run();
    for _ in 0..100 {
        assert_eq!(run(), first);
    }
}
