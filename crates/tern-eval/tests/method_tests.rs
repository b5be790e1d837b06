//! Behavioral tests for method registration, dispatch, and bodies.
//!
//! Covers:
//! - native registration and invocation
//! - interpreted bodies, parameter binding, and result policy
//! - arity and parameter type checks at the call boundary
//! - host failure wrapping
//! - closure capture and call-frame isolation

use tern_eval::{Engine, EvalError, Method, NativeError, Param, Value};
use tern_types::ast::*;
use tern_types::{Span, Type};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn sp() -> Span {
    Span::point(1, 1)
}

fn name(s: &str) -> Ident {
    Ident::new(s, sp())
}

fn int(n: i64) -> Expr {
    Expr::new(ExprKind::IntLit(n), sp())
}

fn float(n: f64) -> Expr {
    Expr::new(ExprKind::FloatLit(n), sp())
}

fn boolean(b: bool) -> Expr {
    Expr::new(ExprKind::BoolLit(b), sp())
}

fn ident(s: &str) -> Expr {
    Expr::new(ExprKind::Identifier(s.into()), sp())
}

fn bin(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn call_at(method: &str, args: Vec<Expr>, line: u32, col: u32) -> Expr {
    let span = Span::point(line, col);
    Expr::new(
        ExprKind::Call {
            name: Ident::new(method, span),
            args,
        },
        span,
    )
}

fn call(method: &str, args: Vec<Expr>) -> Expr {
    call_at(method, args, 1, 1)
}

fn param(n: &str, ty: Type) -> Param {
    Param::new(name(n), ty)
}

fn var(n: &str, init: Expr) -> Stmt {
    Stmt::Declare(DeclareStmt {
        kind: DeclKind::Var,
        name: name(n),
        ty: None,
        init: Some(init),
        span: sp(),
    })
}

fn assign(n: &str, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: name(n),
        value,
        span: sp(),
    })
}

fn body(stmts: Vec<Stmt>) -> Block {
    Block::new(stmts, sp())
}

// ══════════════════════════════════════════════════════════════════════════════
// Native bodies
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn native_method_runs_against_bound_arguments() {
    let mut eng = Engine::new();
    eng.register(Method::native(
        "add",
        vec![param("a", Type::Int), param("b", Type::Int)],
        |ctx| match (ctx.arg(0), ctx.arg(1)) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            _ => Err(NativeError::from("expected two integers")),
        },
    ))
    .unwrap();

    let result = eng.eval_expr(&call("add", vec![int(2), int(3)])).unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn native_failure_is_wrapped_as_engine_failure() {
    let mut eng = Engine::new();
    eng.register(Method::native("boom", vec![], |_ctx| {
        Err(NativeError::from("host exploded"))
    }))
    .unwrap();

    let err = eng.eval_expr(&call_at("boom", vec![], 4, 2)).unwrap_err();
    match err {
        EvalError::EngineFailure { name, message, span } => {
            assert_eq!(name, "boom");
            assert_eq!(message, "host exploded");
            assert_eq!(span, Span::point(4, 2));
        }
        other => panic!("expected EngineFailure, got {other:?}"),
    }
}

#[test]
fn native_can_reenter_the_engine() {
    let mut eng = Engine::new();
    eng.define_method(
        name("incr"),
        vec![param("n", Type::Int)],
        body(vec![Stmt::Expr(bin(ident("n"), BinOp::Add, int(1)))]),
    )
    .unwrap();
    // A native that dispatches back into a registered method.
    eng.register(Method::native(
        "incr_twice",
        vec![param("n", Type::Int)],
        |ctx| {
            let n = ctx.arg(0);
            let once = ctx
                .engine
                .call(&Ident::new("incr", Span::point(0, 0)), vec![n], Span::point(0, 0))
                .map_err(|e| NativeError::from(e.to_string()))?;
            ctx.engine
                .call(&Ident::new("incr", Span::point(0, 0)), vec![once], Span::point(0, 0))
                .map_err(|e| NativeError::from(e.to_string()))
        },
    ))
    .unwrap();

    let result = eng.eval_expr(&call("incr_twice", vec![int(5)])).unwrap();
    assert_eq!(result, Value::Int(7));
}

// ══════════════════════════════════════════════════════════════════════════════
// Interpreted bodies
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn interpreted_body_yields_last_statement_value() {
    let mut eng = Engine::new();
    eng.define_method(
        name("square"),
        vec![param("n", Type::Int)],
        body(vec![
            var("out", bin(ident("n"), BinOp::Mul, ident("n"))),
            Stmt::Expr(ident("out")),
        ]),
    )
    .unwrap();

    assert_eq!(
        eng.eval_expr(&call("square", vec![int(6)])).unwrap(),
        Value::Int(36)
    );
}

#[test]
fn int_argument_widens_into_float_parameter() {
    let mut eng = Engine::new();
    eng.define_method(
        name("half"),
        vec![param("x", Type::Float)],
        body(vec![Stmt::Expr(bin(ident("x"), BinOp::Div, float(2.0)))]),
    )
    .unwrap();

    assert_eq!(
        eng.eval_expr(&call("half", vec![int(3)])).unwrap(),
        Value::Float(1.5)
    );
}

#[test]
fn call_frame_locals_do_not_leak() {
    let mut eng = Engine::new();
    eng.define_method(
        name("noise"),
        vec![],
        body(vec![var("local", int(1)), Stmt::Expr(ident("local"))]),
    )
    .unwrap();

    let depth = eng.scope_depth();
    eng.eval_expr(&call("noise", vec![])).unwrap();
    assert_eq!(eng.scope_depth(), depth);
    assert!(matches!(
        eng.eval_expr(&ident("local")).unwrap_err(),
        EvalError::UndeclaredVariable { .. }
    ));
}

#[test]
fn interpreted_body_sees_definition_time_environment() {
    let mut eng = Engine::new();
    eng.eval_stmt(&var("base", int(10))).unwrap();
    eng.define_method(
        name("offset"),
        vec![param("n", Type::Int)],
        body(vec![Stmt::Expr(bin(ident("base"), BinOp::Add, ident("n")))]),
    )
    .unwrap();

    // The body closes over the environment captured at definition; a later
    // reassignment of the global is not visible inside the body.
    eng.eval_stmt(&assign("base", int(99))).unwrap();
    assert_eq!(
        eng.eval_expr(&call("offset", vec![int(1)])).unwrap(),
        Value::Int(11)
    );
    // The caller's environment is restored after the call.
    assert_eq!(eng.eval_expr(&ident("base")).unwrap(), Value::Int(99));
}

#[test]
fn failing_body_restores_caller_environment_and_depth() {
    let mut eng = Engine::new();
    eng.eval_stmt(&var("x", int(1))).unwrap();
    eng.define_method(
        name("bad"),
        vec![],
        body(vec![Stmt::Expr(ident("no_such_name"))]),
    )
    .unwrap();

    let depth = eng.scope_depth();
    assert!(eng.eval_expr(&call("bad", vec![])).is_err());
    assert_eq!(eng.scope_depth(), depth);
    assert_eq!(eng.eval_expr(&ident("x")).unwrap(), Value::Int(1));
}

// ══════════════════════════════════════════════════════════════════════════════
// Call-boundary checks
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn arity_mismatch_reports_counts_and_runs_nothing() {
    let mut eng = Engine::new();
    eng.eval_stmt(&var("touched", boolean(false))).unwrap();
    eng.define_method(
        name("two"),
        vec![param("a", Type::Int), param("b", Type::Int)],
        body(vec![assign("touched", boolean(true))]),
    )
    .unwrap();

    let err = eng
        .eval_expr(&call_at("two", vec![int(1)], 2, 9))
        .unwrap_err();
    match err {
        EvalError::ArityMismatch {
            name,
            expected,
            found,
            span,
        } => {
            assert_eq!(name, "two");
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
            assert_eq!(span, Span::point(2, 9));
        }
        other => panic!("expected ArityMismatch, got {other:?}"),
    }
    // No partial execution: the body never ran.
    assert_eq!(eng.eval_expr(&ident("touched")).unwrap(), Value::Bool(false));
}

#[test]
fn parameter_type_mismatch_fails_before_the_body_runs() {
    let mut eng = Engine::new();
    eng.eval_stmt(&var("touched", boolean(false))).unwrap();
    eng.define_method(
        name("wants_int"),
        vec![param("n", Type::Int)],
        body(vec![assign("touched", boolean(true))]),
    )
    .unwrap();

    let err = eng
        .eval_expr(&call("wants_int", vec![boolean(true)]))
        .unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
    assert_eq!(eng.eval_expr(&ident("touched")).unwrap(), Value::Bool(false));
}

#[test]
fn float_argument_rejected_for_int_parameter() {
    let mut eng = Engine::new();
    eng.define_method(
        name("wants_int"),
        vec![param("n", Type::Int)],
        body(vec![Stmt::Expr(ident("n"))]),
    )
    .unwrap();

    let err = eng.eval_expr(&call("wants_int", vec![float(1.5)])).unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
}

#[test]
fn unknown_method_is_an_unresolved_name() {
    let mut eng = Engine::new();
    let err = eng.eval_expr(&call_at("ghost", vec![], 7, 3)).unwrap_err();
    match err {
        EvalError::UndeclaredVariable { name, span } => {
            assert_eq!(name, "ghost");
            assert_eq!(span, Span::point(7, 3));
        }
        other => panic!("expected UndeclaredVariable, got {other:?}"),
    }
}

#[test]
fn duplicate_registration_fails() {
    let mut eng = Engine::new();
    eng.register(Method::native("f", vec![], |_| Ok(Value::Undefined)))
        .unwrap();
    let err = eng
        .register(Method::native("f", vec![], |_| Ok(Value::Undefined)))
        .unwrap_err();
    assert!(matches!(err, EvalError::DuplicateDeclaration { ref name, .. } if name == "f"));
}

#[test]
fn unbounded_recursion_is_cut_off_before_the_host_stack() {
    let mut eng = Engine::new();
    eng.define_method(
        name("spin"),
        vec![],
        body(vec![Stmt::Expr(call("spin", vec![]))]),
    )
    .unwrap();

    let depth = eng.scope_depth();
    let err = eng.eval_expr(&call("spin", vec![])).unwrap_err();
    assert!(
        matches!(err, EvalError::RecursionLimit { ref name, .. } if name == "spin"),
        "unexpected error: {err:?}"
    );
    // Every aborted frame is unwound on the way out.
    assert_eq!(eng.scope_depth(), depth);
}

#[test]
fn fuel_still_bounds_recursive_work() {
    let mut eng = Engine::with_fuel(20);
    eng.define_method(
        name("spin"),
        vec![],
        body(vec![Stmt::Expr(call("spin", vec![]))]),
    )
    .unwrap();

    let err = eng.eval_expr(&call("spin", vec![])).unwrap_err();
    assert_eq!(err, EvalError::FuelExhausted);
}

#[test]
fn arguments_evaluate_left_to_right_before_checks() {
    let mut eng = Engine::new();
    eng.define_method(
        name("two"),
        vec![param("a", Type::Int), param("b", Type::Int)],
        body(vec![Stmt::Expr(ident("a"))]),
    )
    .unwrap();
    // A failing first argument surfaces its own error, not an arity error.
    let err = eng
        .eval_expr(&call("two", vec![ident("no_such_name")]))
        .unwrap_err();
    assert!(matches!(err, EvalError::UndeclaredVariable { .. }));
}
