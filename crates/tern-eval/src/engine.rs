//! Core expression and statement evaluator.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::method::{Method, Param};
use crate::symbol::Symbol;
use crate::value::Value;
use std::collections::BTreeMap;
use std::rc::Rc;
use tern_types::ast::*;
use tern_types::{ty, Span, Type};

/// Default evaluation step budget.
const DEFAULT_FUEL: u64 = 1_000_000;

/// Maximum nested call depth. Each nested call costs a stack of host
/// frames plus an environment clone, so this is bounded well below what
/// the fuel budget alone would admit.
const MAX_CALL_DEPTH: usize = 256;

/// The evaluation engine — walks syntax-tree nodes and produces Values.
///
/// Single-threaded, synchronous recursion: one expression fully completes
/// (or fails) before the next sibling begins. Independent concurrent
/// evaluations need entirely separate engines.
pub struct Engine {
    /// Symbol table (scoped).
    pub env: Environment,
    /// Registered methods, shared by every call site that resolves to them.
    methods: BTreeMap<String, Rc<Method>>,
    /// Steps consumed so far.
    fuel: u64,
    /// Step budget — bounds total work.
    fuel_limit: u64,
    /// Live nested-call count, capped at [`MAX_CALL_DEPTH`].
    call_depth: usize,
}

impl Engine {
    /// Create an engine with the default step budget.
    pub fn new() -> Self {
        Self::with_fuel(DEFAULT_FUEL)
    }

    /// Create an engine with a custom step budget. Fuel bounds total work;
    /// nested call depth is bounded separately so runaway recursion fails
    /// with `RecursionLimit` instead of exhausting the host stack.
    pub fn with_fuel(fuel_limit: u64) -> Self {
        Self {
            env: Environment::new(),
            methods: BTreeMap::new(),
            fuel: 0,
            fuel_limit,
            call_depth: 0,
        }
    }

    /// Consume one step. Fails once the budget is exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.fuel += 1;
        if self.fuel > self.fuel_limit {
            Err(EvalError::FuelExhausted)
        } else {
            Ok(())
        }
    }

    /// Live scope-frame count. Balanced across any evaluation, failed or not.
    pub fn scope_depth(&self) -> usize {
        self.env.depth()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Method registration (host boundary)
    // ══════════════════════════════════════════════════════════════════════

    /// Register a method. Fails `DuplicateDeclaration` if the name is taken.
    pub fn register(&mut self, method: Method) -> EvalResult<()> {
        if self.methods.contains_key(method.name()) {
            return Err(EvalError::DuplicateDeclaration {
                name: method.name().to_string(),
                span: method.decl_span(),
            });
        }
        self.methods.insert(method.name().to_string(), Rc::new(method));
        Ok(())
    }

    /// Define an interpreted method, capturing the current environment as
    /// the body's closure.
    pub fn define_method(
        &mut self,
        name: Ident,
        params: Vec<Param>,
        body: Block,
    ) -> EvalResult<()> {
        let captured = self.env.clone();
        self.register(Method::interpreted(name, params, body, captured))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.tick()?;
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::FloatLit(n) => Ok(Value::Float(*n)),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),

            ExprKind::Identifier(name) => self.eval_identifier(name, expr.span),

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, expr.span),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand, expr.span),

            ExprKind::Call { name, args } => self.eval_call(name, args, expr.span),
        }
    }

    fn eval_identifier(&self, name: &str, span: Span) -> EvalResult<Value> {
        self.env
            .resolve(name)
            .map(|sym| sym.value())
            .ok_or_else(|| EvalError::UndeclaredVariable {
                name: name.to_string(),
                span,
            })
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr, span: Span) -> EvalResult<Value> {
        if matches!(op, BinOp::And | BinOp::Or) {
            return self.eval_logical(left, op, right, span);
        }

        // Eager, left-to-right; the lattice decides the result type before
        // any payload computation.
        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;
        let out = ty::result_type(op, lv.type_of(), rv.type_of()).ok_or_else(|| {
            EvalError::TypeMismatch {
                message: format!(
                    "'{}' is not defined for {} and {}",
                    op.lexeme(),
                    lv.type_of(),
                    rv.type_of()
                ),
                lexeme: op.lexeme().to_string(),
                span,
            }
        })?;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.apply_arith(op, lv, rv, out, span)
            }
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
                Ok(Value::Bool(Self::compare(op, lv, rv)))
            }
            BinOp::Eq => Ok(Value::Bool(Self::values_equal(lv, rv))),
            BinOp::NotEq => Ok(Value::Bool(!Self::values_equal(lv, rv))),
            BinOp::And | BinOp::Or => unreachable!("handled by eval_logical"),
        }
    }

    fn apply_arith(
        &self,
        op: BinOp,
        lv: Value,
        rv: Value,
        out: Type,
        span: Span,
    ) -> EvalResult<Value> {
        if out == Type::Int {
            if let (Value::Int(a), Value::Int(b)) = (lv, rv) {
                if b == 0 && matches!(op, BinOp::Div | BinOp::Mod) {
                    return Err(EvalError::ArithmeticError {
                        message: format!("{} by zero", if op == BinOp::Div { "division" } else { "modulo" }),
                        lexeme: op.lexeme().to_string(),
                        span,
                    });
                }
                let result = match op {
                    BinOp::Add => a.checked_add(b),
                    BinOp::Sub => a.checked_sub(b),
                    BinOp::Mul => a.checked_mul(b),
                    BinOp::Div => a.checked_div(b),
                    BinOp::Mod => a.checked_rem(b),
                    _ => None,
                };
                return result.map(Value::Int).ok_or_else(|| EvalError::ArithmeticError {
                    message: "integer overflow".to_string(),
                    lexeme: op.lexeme().to_string(),
                    span,
                });
            }
        }
        // Float result: mixed operands widen. Float arithmetic follows IEEE.
        match (lv.as_f64(), rv.as_f64()) {
            (Some(a), Some(b)) => {
                let result = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Mod => a % b,
                    _ => unreachable!("arithmetic operator expected"),
                };
                Ok(Value::Float(result))
            }
            _ => unreachable!("lattice admits only numeric operands here"),
        }
    }

    fn compare(op: BinOp, lv: Value, rv: Value) -> bool {
        if let (Value::Int(a), Value::Int(b)) = (lv, rv) {
            return match op {
                BinOp::Less => a < b,
                BinOp::Greater => a > b,
                BinOp::LessEq => a <= b,
                BinOp::GreaterEq => a >= b,
                _ => unreachable!("comparison operator expected"),
            };
        }
        match (lv.as_f64(), rv.as_f64()) {
            (Some(a), Some(b)) => match op {
                BinOp::Less => a < b,
                BinOp::Greater => a > b,
                BinOp::LessEq => a <= b,
                BinOp::GreaterEq => a >= b,
                _ => unreachable!("comparison operator expected"),
            },
            _ => unreachable!("lattice admits only numeric operands here"),
        }
    }

    /// Equality over same-kind or mixed numeric operands. NaN != NaN.
    fn values_equal(lv: Value, rv: Value) -> bool {
        match (lv, rv) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => match (lv.as_f64(), rv.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => unreachable!("lattice admits only comparable operands here"),
            },
        }
    }

    /// `and`/`or`: the left operand decides whether the right is evaluated
    /// at all. Every operand actually evaluated must be Boolean.
    fn eval_logical(&mut self, left: &Expr, op: BinOp, right: &Expr, span: Span) -> EvalResult<Value> {
        let lv = self.eval_expr(left)?;
        let lb = Self::expect_bool(lv, op, "left", span)?;
        match (op, lb) {
            (BinOp::And, false) => Ok(Value::Bool(false)),
            (BinOp::Or, true) => Ok(Value::Bool(true)),
            _ => {
                let rv = self.eval_expr(right)?;
                let rb = Self::expect_bool(rv, op, "right", span)?;
                Ok(Value::Bool(rb))
            }
        }
    }

    fn expect_bool(value: Value, op: BinOp, side: &str, span: Span) -> EvalResult<bool> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch {
                message: format!(
                    "'{}' requires Boolean on the {side}, got {}",
                    op.lexeme(),
                    other.type_of()
                ),
                lexeme: op.lexeme().to_string(),
                span,
            }),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> EvalResult<Value> {
        let val = self.eval_expr(operand)?;
        ty::unary_result_type(op, val.type_of()).ok_or_else(|| EvalError::TypeMismatch {
            message: format!("'{}' is not defined for {}", op.lexeme(), val.type_of()),
            lexeme: op.lexeme().to_string(),
            span,
        })?;
        match (op, val) {
            (UnaryOp::Neg, Value::Int(n)) => {
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::ArithmeticError {
                        message: "integer overflow".to_string(),
                        lexeme: op.lexeme().to_string(),
                        span,
                    })
            }
            (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            _ => unreachable!("lattice rejected the operand above"),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(&mut self, name: &Ident, args: &[Expr], span: Span) -> EvalResult<Value> {
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.eval_expr(arg)?);
        }
        self.call(name, arg_vals, span)
    }

    /// Dispatch a call with already-evaluated arguments.
    ///
    /// Arity and per-parameter type checks happen before the body runs, so
    /// a failed call leaves no body side effects behind.
    pub fn call(&mut self, name: &Ident, args: Vec<Value>, span: Span) -> EvalResult<Value> {
        let method = self.methods.get(&name.name).cloned().ok_or_else(|| {
            EvalError::UndeclaredVariable {
                name: name.name.clone(),
                span: name.span,
            }
        })?;

        if args.len() != method.arity() {
            return Err(EvalError::ArityMismatch {
                name: name.name.clone(),
                expected: method.arity(),
                found: args.len(),
                span,
            });
        }
        for (param, arg) in method.params().iter().zip(&args) {
            if !ty::is_assignable(arg.type_of(), param.ty) {
                return Err(EvalError::TypeMismatch {
                    message: format!(
                        "parameter '{}' of '{}' expects {}, got {}",
                        param.name.name,
                        name.name,
                        param.ty,
                        arg.type_of()
                    ),
                    lexeme: param.name.name.clone(),
                    span,
                });
            }
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(EvalError::RecursionLimit {
                name: name.name.clone(),
                span,
            });
        }

        self.call_depth += 1;
        let mut ctx = EvalContext {
            args,
            call_span: span,
            engine: self,
        };
        let result = method.apply(&mut ctx);
        self.call_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Block & statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a block in a fresh child scope. The scope is popped on
    /// success and on failure alike.
    pub fn eval_block(&mut self, block: &Block) -> EvalResult<Value> {
        self.env.push_scope();
        let result = self.eval_stmts(&block.stmts);
        self.env.pop_scope();
        result
    }

    /// Evaluate statements in order; the value of the last one is the
    /// result (Undefined for an empty sequence).
    pub(crate) fn eval_stmts(&mut self, stmts: &[Stmt]) -> EvalResult<Value> {
        let mut last = Value::Undefined;
        for stmt in stmts {
            last = self.eval_stmt(stmt)?;
        }
        Ok(last)
    }

    /// Evaluate a single statement.
    pub fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<Value> {
        self.tick()?;
        match stmt {
            Stmt::Declare(decl) => self.eval_declare(decl),
            Stmt::Assign(assign) => self.eval_assign(assign),
            Stmt::Expr(expr) => self.eval_expr(expr),
            Stmt::Block(block) => self.eval_block(block),
        }
    }

    /// Declaration order: create the symbol, evaluate the initializer,
    /// assign, then — for constants — lock. The initializer itself runs in
    /// the constant's writable window.
    fn eval_declare(&mut self, decl: &DeclareStmt) -> EvalResult<Value> {
        let symbol = match decl.kind {
            DeclKind::Var => Symbol::variable(&decl.name.name, decl.ty, decl.name.span),
            DeclKind::Const => Symbol::constant(&decl.name.name, decl.ty, decl.name.span),
        };
        self.env.declare(symbol)?;

        // The constant locks whether or not its initializer succeeded: the
        // symbol is already declared, and a failed initializer must not
        // leave a writable constant behind.
        let init_result = match &decl.init {
            Some(init) => self
                .eval_expr(init)
                .and_then(|value| self.assign_to(&decl.name, value)),
            None => Ok(()),
        };
        if decl.kind == DeclKind::Const {
            if let Some(sym) = self.env.resolve_mut(&decl.name.name) {
                sym.lock();
            }
        }
        init_result?;
        Ok(Value::Undefined)
    }

    /// Assignment order: right-hand side first, then target resolution.
    fn eval_assign(&mut self, assign: &AssignStmt) -> EvalResult<Value> {
        let value = self.eval_expr(&assign.value)?;
        self.assign_to(&assign.target, value)?;
        Ok(Value::Undefined)
    }

    fn assign_to(&mut self, target: &Ident, value: Value) -> EvalResult<()> {
        match self.env.resolve_mut(&target.name) {
            Some(sym) => sym.assign(value, target.span),
            None => Err(EvalError::UndeclaredVariable {
                name: target.name.clone(),
                span: target.span,
            }),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Evaluation context
// ══════════════════════════════════════════════════════════════════════════════

/// The per-call environment handed to a method body: the bound argument
/// values, the call-site span, and the engine for re-entrant evaluation.
/// Constructed fresh per call; lives exactly for one `apply`.
pub struct EvalContext<'a> {
    args: Vec<Value>,
    call_span: Span,
    pub engine: &'a mut Engine,
}

impl EvalContext<'_> {
    /// Argument by position. Out-of-range reads yield Undefined; arity was
    /// checked at the call boundary.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).copied().unwrap_or(Value::Undefined)
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn call_span(&self) -> Span {
        self.call_span
    }

    /// Re-entrant evaluation of a nested expression.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.engine.eval_expr(expr)
    }

    /// Run an interpreted body: swap in the captured (closure) environment,
    /// push a call frame, bind parameters as writable variables, evaluate
    /// the body, and restore the caller's environment on every path.
    pub(crate) fn run_interpreted(
        &mut self,
        params: &[Param],
        body: &Block,
        captured: &Environment,
    ) -> EvalResult<Value> {
        let saved = std::mem::replace(&mut self.engine.env, captured.clone());
        self.engine.env.push_scope();
        let result = self.bind_params_and_run(params, body);
        self.engine.env.pop_scope();
        self.engine.env = saved;
        result
    }

    fn bind_params_and_run(&mut self, params: &[Param], body: &Block) -> EvalResult<Value> {
        let args = self.args.clone();
        for (param, arg) in params.iter().zip(args) {
            let mut sym = Symbol::variable(&param.name.name, Some(param.ty), param.name.span);
            sym.assign(arg.widen_to(param.ty), param.name.span)?;
            self.engine.env.declare(sym)?;
        }
        self.engine.eval_stmts(&body.stmts)
    }
}
