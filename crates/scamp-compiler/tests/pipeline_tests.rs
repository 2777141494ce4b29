//! End-to-end pipeline tests: source → parse → scope check → evaluation.

use scamp_compiler::{
    compile_appended, compile_expr, compile_program, compile_source, parse_expression,
    parse_program,
};
use scamp_eval::{Environment, ProgramState, ProgramTrace};
use scamp_types::ast::*;
use scamp_types::{ErrorCode, Phase, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn compile_ok(src: &str) -> Program {
    match compile_program(src) {
        Ok(program) => program,
        Err(errors) => {
            for e in &errors.errors {
                eprintln!("  ERROR: {} ({})", e.message, e.code);
            }
            panic!("unexpected compile errors (see above)");
        }
    }
}

fn error_codes(src: &str) -> Vec<ErrorCode> {
    compile_program(src)
        .expect_err("compilation should fail")
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

fn run(src: &str) -> ProgramState {
    ProgramState::new(compile_ok(src)).evaluate()
}

const FACTORIAL: &str = r#"
; factorial, defined before use
(define (fact n)
  (if (= n 0)
      1
      (* n (fact (- n 1)))))

(fact 5)
"#;

const LISTS: &str = r#"
(define (length xs)
  (cond [(null? xs) 0]
        [else (+ 1 (length (cdr xs)))]))

(define (map f xs)
  (if (null? xs)
      null
      (cons (f (car xs)) (map f (cdr xs)))))

(define nums (list 1 2 3))
(length nums)
(map (lambda (x) (* x x)) nums)
"#;

// ─────────────────────────────────────────────────────────────────────
// End to end
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_define_then_use() {
    let state = run("(define x 1) (+ x 2)");
    assert_eq!(state.env().len(), 1);
    assert_eq!(state.env().get("x"), Some(&Expr::number(1.0)));
    assert_eq!(state.program()[1], Stmt::ExprDone(Expr::number(3.0)));
}

#[test]
fn test_factorial() {
    let state = run(FACTORIAL);
    assert_eq!(state.program()[1], Stmt::ExprDone(Expr::number(120.0)));
}

#[test]
fn test_list_functions() {
    let state = run(LISTS);
    assert_eq!(state.program()[3], Stmt::ExprDone(Expr::number(3.0)));
    assert_eq!(
        state.program()[4].to_string(),
        "(cons 1 (cons 4 (cons 9 null)))"
    );
}

#[test]
fn test_trace_over_compiled_program() {
    let mut trace = ProgramTrace::from_program(compile_ok(FACTORIAL));
    trace.eval_next_stmt();
    assert!(trace.current_state().env().contains("fact"));
    trace.evaluate_prog();
    let snapshot = trace.snapshot();
    assert!(snapshot.finished);
    assert_eq!(snapshot.statements[1].text, "120");
}

#[test]
fn test_runtime_error_after_clean_compile() {
    let state = run("(define (f x) x)\n(f 1 2)\n(+ 1 1)");
    match &state.program()[1] {
        Stmt::Error(err) => {
            assert_eq!(err.phase, Phase::Runtime);
            assert_eq!(err.code, ErrorCode::ARITY_MISMATCH);
        }
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(state.program()[2], Stmt::ExprDone(Expr::number(2.0)));
}

// ─────────────────────────────────────────────────────────────────────
// Scope checking
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unbound_name() {
    let errors = compile_program("(+ y 1)").unwrap_err();
    let err = &errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNBOUND_NAME);
    assert_eq!(err.phase, Phase::Scope);
    assert_eq!(err.message, "unbound name 'y'");
    assert_eq!(err.snippet.as_deref(), Some("(+ y 1)"));
}

#[test]
fn test_unbound_name_suggestion() {
    let errors = compile_program("(define total 3)\n(+ totl 1)").unwrap_err();
    assert_eq!(
        errors.errors[0].hint.as_deref(),
        Some("did you mean 'total'?")
    );
    let errors = compile_program("(cra null)").unwrap_err();
    assert_eq!(errors.errors[0].hint.as_deref(), Some("did you mean 'car'?"));
}

#[test]
fn test_forward_reference_allowed() {
    compile_ok("(define (even? n) (if (= n 0) #t (odd? (- n 1))))\n(define (odd? n) (if (= n 0) #f (even? (- n 1))))");
}

#[test]
fn test_duplicate_define() {
    assert_eq!(
        error_codes("(define a 1)\n(define a 2)"),
        vec![ErrorCode::DUPLICATE_DEFINE]
    );
}

#[test]
fn test_duplicate_parameter() {
    assert_eq!(
        error_codes("(lambda (x x) x)"),
        vec![ErrorCode::DUPLICATE_PARAMETER]
    );
}

#[test]
fn test_let_scoping_is_sequential() {
    compile_ok("(let ([a 1] [b a] [a (+ a b)]) a)");
    assert_eq!(error_codes("(let ([a b] [b 1]) a)"), vec![ErrorCode::UNBOUND_NAME]);
    assert_eq!(error_codes("(+ (let ([z 1]) z) z)"), vec![ErrorCode::UNBOUND_NAME]);
}

#[test]
fn test_lambda_parameters_scoped_to_body() {
    assert_eq!(
        error_codes("(define f (lambda (p) p))\np"),
        vec![ErrorCode::UNBOUND_NAME]
    );
}

#[test]
fn test_primitives_in_scope() {
    compile_ok("(string-append \"a\" (car (list \"b\")))");
}

#[test]
fn test_all_scope_errors_reported() {
    let codes = error_codes("(+ a b)\n(c)");
    assert_eq!(codes.len(), 3);
}

// ─────────────────────────────────────────────────────────────────────
// Parse errors through the pipeline
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lex_and_parse_errors_combined() {
    let codes = error_codes("\"open\n(if)");
    assert!(codes.contains(&ErrorCode::UNTERMINATED_STRING));
}

#[test]
fn test_parse_errors_skip_scope_check() {
    let codes = error_codes("(if x)");
    assert_eq!(codes, vec![ErrorCode::MALFORMED_FORM]);
}

#[test]
fn test_parse_helpers() {
    let sf = SourceFile::new("t.scm", "(define x 1)");
    assert_eq!(parse_program(&sf).unwrap().len(), 1);
    let sf = SourceFile::new("t.scm", "(f 1)");
    assert!(parse_expression(&sf).is_ok());
    let sf = SourceFile::new("t.scm", "(f 1)");
    assert!(compile_source(&sf).is_err());
}

// ─────────────────────────────────────────────────────────────────────
// Expressions and appended statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_compile_expr_sees_environment() {
    let env = Environment::new().extend("k", Expr::number(2.0));
    let expr = compile_expr(&env, "(* k 21)").unwrap();
    assert_eq!(scamp_eval::evaluate(&env, &expr).unwrap(), Expr::number(42.0));
    let errors = compile_expr(&Environment::new(), "(* k 21)").unwrap_err();
    assert_eq!(errors.errors[0].code, ErrorCode::UNBOUND_NAME);
}

#[test]
fn test_compile_appended() {
    let program = compile_ok("(define x 1)");
    let state = ProgramState::new(program.clone());
    let stmts = compile_appended(&program, state.env(), "(define y (+ x 1))\n(* y 2)").unwrap();
    assert_eq!(stmts.len(), 2);

    let errors = compile_appended(&program, state.env(), "(define z 1)\n(define z 2)").unwrap_err();
    assert_eq!(errors.errors[0].code, ErrorCode::DUPLICATE_DEFINE);
}

#[test]
fn test_appended_define_may_replace_existing_name() {
    let mut trace = ProgramTrace::from_program(compile_ok("(define x 1)"));
    trace.evaluate_prog();

    let stmts = {
        let state = trace.current_state();
        compile_appended(state.program(), state.env(), "(define x 5)\n(+ x 1)").unwrap()
    };
    for stmt in stmts {
        trace.add_stmt(stmt);
    }
    trace.evaluate_prog();

    let state = trace.current_state();
    assert_eq!(state.env().get("x"), Some(&Expr::number(5.0)));
    assert_eq!(state.program()[2], Stmt::ExprDone(Expr::number(6.0)));
}

#[test]
fn test_did_you_mean_covers_defines_and_primitives() {
    let errors = compile_program("(define total 3)\n(+ totl (lenght 1))").unwrap_err();
    let hints: Vec<_> = errors.errors.iter().filter_map(|e| e.hint.clone()).collect();
    assert_eq!(hints.len(), 2);
    assert!(hints[0].contains("'total'"));
}

#[test]
fn test_errors_serialize_for_front_ends() {
    let errors = compile_program("(+ nope 1)").unwrap_err();
    let value = serde_json::to_value(&errors).unwrap();
    assert_eq!(value["total_errors"], serde_json::json!(1));
    assert_eq!(value["errors"][0]["phase"], serde_json::json!("scope"));
}

#[test]
fn test_compile_deterministic() {
    let first = compile_ok(LISTS);
    for _ in 0..100 {
        assert_eq!(compile_ok(LISTS), first);
    }
}
