//! Evaluator: walks the AST against a graph context.
//!
//! Every [`Interpreter::evaluate`] call holds a [`DepthGuard`] for its whole
//! extent. Inside that scope it checks the recursion and population ceilings,
//! extracts keyword arguments, reduces operands (unless the operator is a
//! special form) and dispatches to the operator's gesture.
//!
//! A [`LimitError`] raised anywhere in the call is handed to the
//! [`LimitHandler`] before the guard is released, and the handler's result
//! becomes the call's result. Limits therefore never leave `evaluate`; every
//! other error does.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::error::{EvalError, EvalResult, LimitError, LogosResult};
use crate::export::CycleRecord;
use crate::gesture::{Gesture, GestureRegistry, OperatorKind, builtin};
use crate::parser::parse_program;
use crate::value::{Keywords, Value};

/// Entity created when a limit is acknowledged.
pub const LIMIT_MARKER: &str = "limit_acknowledged";

/// Intention attached to the limit marker.
pub const LIMIT_INTENTION: &str = "automatic Ω-return at limit";

/// Dialogue scores carried into a cycle record.
const RECENT_DIALOGUES: usize = 10;

// ---------------------------------------------------------------------------
// Depth guard
// ---------------------------------------------------------------------------

/// Scoped recursion budget: increments on entry, decrements on drop.
#[derive(Debug)]
struct DepthGuard {
    depth: Rc<Cell<usize>>,
}

impl DepthGuard {
    fn enter(depth: &Rc<Cell<usize>>) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth: Rc::clone(depth),
        }
    }

    fn level(&self) -> usize {
        self.depth.get()
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Limit handling
// ---------------------------------------------------------------------------

/// Recovery strategy for a tripped ceiling or content rule.
pub trait LimitHandler {
    fn name(&self) -> &str;

    /// Perform one recovery action. The returned value replaces the result
    /// of the call that hit the limit.
    fn handle_limit(
        &self,
        interp: &mut Interpreter,
        error: &LimitError,
        intentions: &[String],
    ) -> EvalResult<Value>;
}

impl fmt::Debug for dyn LimitHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LimitHandler({})", self.name())
    }
}

/// Default recovery: collapse a [`LIMIT_MARKER`] entity into the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerRecovery;

impl LimitHandler for MarkerRecovery {
    fn name(&self) -> &str {
        "marker"
    }

    fn handle_limit(
        &self,
        interp: &mut Interpreter,
        _error: &LimitError,
        _intentions: &[String],
    ) -> EvalResult<Value> {
        let alpha = interp.alpha();
        alpha.execute(
            interp,
            &[Value::str(LIMIT_MARKER)],
            &Keywords::new(),
            &[LIMIT_INTENTION.to_string()],
        )
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Settings applied at the start of a program cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleOptions {
    pub operator_id: Option<String>,
    pub fair_care: bool,
}

/// Per-expression results plus the cycle record.
#[derive(Debug, Clone)]
pub struct ProgramOutcome {
    pub results: Vec<Value>,
    pub cycle: CycleRecord,
}

/// Tree-walking evaluator bound to one context.
#[derive(Debug)]
pub struct Interpreter {
    context: Context,
    gestures: GestureRegistry,
    depth: Rc<Cell<usize>>,
    limit_handler: Rc<dyn LimitHandler>,
    cycles: usize,
}

impl Interpreter {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            gestures: GestureRegistry::with_builtins(),
            depth: Rc::new(Cell::new(0)),
            limit_handler: Rc::new(MarkerRecovery),
            cycles: 0,
        }
    }

    /// Replace the limit recovery strategy.
    pub fn with_limit_handler(mut self, handler: impl LimitHandler + 'static) -> Self {
        self.limit_handler = Rc::new(handler);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn gestures(&self) -> &GestureRegistry {
        &self.gestures
    }

    /// Register additional gestures or override built-in ones.
    pub fn gestures_mut(&mut self) -> &mut GestureRegistry {
        &mut self.gestures
    }

    pub fn gesture(&self, symbol: &str) -> Option<Rc<dyn Gesture>> {
        self.gestures.get(symbol)
    }

    /// Current nesting depth. Zero between top-level calls.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Evaluate one expression.
    pub fn evaluate(&mut self, expr: &Value, intentions: &[String]) -> EvalResult<Value> {
        let guard = DepthGuard::enter(&self.depth);
        match self.evaluate_guarded(guard.level(), expr, intentions) {
            Err(EvalError::Limit(limit)) => Ok(self.recover(&limit, intentions)),
            other => other,
        }
    }

    fn evaluate_guarded(
        &mut self,
        depth: usize,
        expr: &Value,
        intentions: &[String],
    ) -> EvalResult<Value> {
        let axioms = self.context.axioms();
        axioms.check_recursion_depth(depth)?;
        axioms.check_entity_count(self.context.node_count())?;

        let items = match expr {
            Value::List(items) => items,
            atom => return Ok(atom.clone()),
        };
        let Some((Value::Str(symbol), operands)) = items.split_first() else {
            return Err(EvalError::Type {
                expr: expr.to_string(),
            });
        };

        let (positional, kwargs) = split_operands(operands);

        let Some(gesture) = self.gestures.get(symbol) else {
            tracing::debug!(symbol = %symbol, "unknown operator, collapsing into entity");
            let alpha = self.alpha();
            return alpha.execute(self, &[Value::str(symbol)], &Keywords::new(), intentions);
        };

        let kind = gesture.kind();
        let args = if kind.is_special_form() {
            positional
        } else {
            let mut reduced = Vec::with_capacity(positional.len());
            for operand in positional {
                reduced.push(match operand {
                    Value::List(_) => self.evaluate(&operand, intentions)?,
                    atom => atom,
                });
            }
            reduced
        };

        tracing::debug!(operator = %symbol, args = args.len(), depth, "dispatch");
        let result = gesture.execute(self, &args, &kwargs, intentions)?;
        if kind.is_significant() && !result.is_nil() {
            tracing::debug!(operator = %symbol, result = %result, "significant gesture");
        }
        Ok(result)
    }

    fn recover(&mut self, limit: &LimitError, intentions: &[String]) -> Value {
        tracing::warn!(error = %limit, depth = self.depth(), "limit reached, recovering");
        let handler = Rc::clone(&self.limit_handler);
        match handler.handle_limit(self, limit, intentions) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, handler = handler.name(), "limit recovery failed");
                Value::Nil
            }
        }
    }

    /// The registered Α gesture, or a fresh one if it was removed.
    fn alpha(&self) -> Rc<dyn Gesture> {
        let glyph = OperatorKind::Alpha.glyph();
        self.gestures
            .get(glyph)
            .unwrap_or_else(|| builtin(OperatorKind::Alpha, glyph))
    }

    // -----------------------------------------------------------------------
    // Programs
    // -----------------------------------------------------------------------

    /// Evaluate a sequence of top-level expressions.
    ///
    /// An expression that fails becomes an inline [`Value::Error`] and the
    /// rest still run.
    pub fn eval_program(
        &mut self,
        program: &[Value],
        intentions: &[String],
        options: &CycleOptions,
    ) -> ProgramOutcome {
        if let Some(op) = &options.operator_id {
            self.context.set_operator(op.clone());
        }
        if options.fair_care {
            self.context.enable_fair_care_validation();
        }

        self.cycles += 1;
        let timestamp = crate::context::now_secs();
        let cycle_id = format!("cycle_{timestamp}_{}", self.cycles);

        let mut results = Vec::with_capacity(program.len());
        for (index, expr) in program.iter().enumerate() {
            match self.evaluate(expr, intentions) {
                Ok(value) => results.push(value),
                Err(err) => {
                    tracing::warn!(index, error = %err, "expression failed");
                    results.push(Value::Error(err.to_string()));
                }
            }
        }

        let successful = results.iter().filter(|r| !r.is_error()).count();
        let dialogues = self.context.dialogues();
        let start = dialogues.len().saturating_sub(RECENT_DIALOGUES);
        let recent_dialogue_scores = dialogues[start..].iter().map(|d| d.score.overall).collect();
        let dialogue_count = dialogues.len();

        let cycle = CycleRecord {
            cycle_id,
            timestamp,
            expressions_evaluated: program.len(),
            successful_evaluations: successful,
            results: results.clone(),
            final_coherence: self.context.coherence(),
            dialogue_count,
            recent_dialogue_scores,
            operator_id: options.operator_id.clone(),
            fair_care_enabled: options.fair_care,
        };
        tracing::info!(
            cycle = %cycle.cycle_id,
            evaluated = cycle.expressions_evaluated,
            successful = cycle.successful_evaluations,
            coherence = cycle.final_coherence,
            "cycle complete"
        );
        ProgramOutcome { results, cycle }
    }

    /// Tokenize, parse and evaluate `source` as one program.
    pub fn run_source(&mut self, source: &str, options: &CycleOptions) -> LogosResult<ProgramOutcome> {
        let program = parse_program(source, "<input>", self.context.axioms())?;
        Ok(self.eval_program(&program.expressions, &program.intentions, options))
    }
}

/// Split operands into positionals and `:key value` pairs in one pass.
///
/// A keyword with nothing after it gets `true`. Keys are stored without the
/// colon; a repeated key overwrites the earlier value.
pub fn split_operands(operands: &[Value]) -> (Vec<Value>, Keywords) {
    let mut positional = Vec::with_capacity(operands.len());
    let mut kwargs = Keywords::new();
    let mut i = 0;
    while i < operands.len() {
        match operands[i].as_keyword() {
            Some(key) => {
                match operands.get(i + 1) {
                    Some(value) => {
                        kwargs.insert(key, value.clone());
                        i += 2;
                    }
                    None => {
                        kwargs.insert(key, Value::Bool(true));
                        i += 1;
                    }
                }
            }
            None => {
                positional.push(operands[i].clone());
                i += 1;
            }
        }
    }
    (positional, kwargs)
}
