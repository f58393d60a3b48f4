//! Gestures: the executable behavior bound to each operator symbol.
//!
//! # Architecture
//!
//! - [`OperatorKind`]: the six operators, with glyph and Latin alias
//! - [`Gesture`] trait: `execute(interp, args, kwargs, intentions) -> Value`
//! - [`GestureRegistry`]: symbol → handler table consulted by the evaluator
//!
//! Every symbol gets its own handler instance. `Λ` and `Lambda` run the same
//! logic but never share per-instance state such as the invocation counter.
//!
//! Special forms (`Α`, `Ω`, `Φ`) receive their positional operands
//! unevaluated and decide themselves what to evaluate. The others receive
//! operands after the evaluator has reduced every nested list.

mod alpha;
mod lambda;
mod nabla;
mod omega;
mod phi;
mod sigma;

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::context::Attributes;
use crate::context::entity::INTENTION_KEY;
use crate::error::{EvalError, EvalResult};
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

pub use alpha::Alpha;
pub use lambda::Lambda;
pub use nabla::Nabla;
pub use omega::Omega;
pub use phi::Phi;
pub use sigma::Sigma;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// The six LOGOS-κ operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Collapse: name something into existence.
    Alpha,
    /// Connection.
    Lambda,
    /// Synthesis.
    Sigma,
    /// Return.
    Omega,
    /// Enrichment.
    Nabla,
    /// Dialogue.
    Phi,
}

impl OperatorKind {
    pub const ALL: [Self; 6] = [
        Self::Alpha,
        Self::Lambda,
        Self::Sigma,
        Self::Omega,
        Self::Nabla,
        Self::Phi,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Alpha => "Α",
            Self::Lambda => "Λ",
            Self::Sigma => "Σ",
            Self::Omega => "Ω",
            Self::Nabla => "∇",
            Self::Phi => "Φ",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Self::Alpha => "Alpha",
            Self::Lambda => "Lambda",
            Self::Sigma => "Sigma",
            Self::Omega => "Omega",
            Self::Nabla => "Nabla",
            Self::Phi => "Phi",
        }
    }

    /// Resolve a glyph or alias.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.glyph() == symbol || k.alias() == symbol)
    }

    /// Operands reach the handler unevaluated.
    pub fn is_special_form(self) -> bool {
        matches!(self, Self::Alpha | Self::Omega | Self::Phi)
    }

    /// A non-nil result marks the call significant.
    pub fn is_significant(self) -> bool {
        matches!(self, Self::Alpha | Self::Lambda | Self::Sigma | Self::Nabla)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

// ---------------------------------------------------------------------------
// Gesture trait
// ---------------------------------------------------------------------------

/// Behavior bound to one operator symbol.
pub trait Gesture {
    /// The symbol this instance is registered under.
    fn symbol(&self) -> &str;

    fn kind(&self) -> OperatorKind;

    /// Run the gesture.
    ///
    /// `args` are the positional operands (raw for special forms), `kwargs`
    /// the extracted `:key value` pairs, `intentions` the input's comment
    /// metadata.
    fn execute(
        &self,
        interp: &mut Interpreter,
        args: &[Value],
        kwargs: &Keywords,
        intentions: &[String],
    ) -> EvalResult<Value>;

    /// How many times this instance has run.
    fn invocations(&self) -> usize;
}

impl fmt::Debug for dyn Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gesture({})", self.symbol())
    }
}

/// Per-instance bookkeeping shared by the built-in gestures.
#[derive(Debug)]
pub(crate) struct GestureState {
    symbol: String,
    invocations: Cell<usize>,
}

impl GestureState {
    pub(crate) fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            invocations: Cell::new(0),
        }
    }

    pub(crate) fn symbol(&self) -> &str {
        &self.symbol
    }

    pub(crate) fn bump(&self) {
        self.invocations.set(self.invocations.get() + 1);
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.get()
    }
}

/// Fresh handler instance for `kind`, registered under `symbol`.
pub fn builtin(kind: OperatorKind, symbol: &str) -> Rc<dyn Gesture> {
    match kind {
        OperatorKind::Alpha => Rc::new(Alpha::new(symbol)),
        OperatorKind::Lambda => Rc::new(Lambda::new(symbol)),
        OperatorKind::Sigma => Rc::new(Sigma::new(symbol)),
        OperatorKind::Omega => Rc::new(Omega::new(symbol)),
        OperatorKind::Nabla => Rc::new(Nabla::new(symbol)),
        OperatorKind::Phi => Rc::new(Phi::new(symbol)),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Symbol → gesture lookup table.
#[derive(Default)]
pub struct GestureRegistry {
    gestures: HashMap<String, Rc<dyn Gesture>>,
}

impl fmt::Debug for GestureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols = self.symbols();
        symbols.sort_unstable();
        f.debug_struct("GestureRegistry")
            .field("gestures", &symbols)
            .finish()
    }
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six operators, each under its glyph and its alias, as separate
    /// instances.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for kind in OperatorKind::ALL {
            reg.register(builtin(kind, kind.glyph()));
            reg.register(builtin(kind, kind.alias()));
        }
        reg
    }

    /// Register a gesture under its own symbol, replacing any previous one.
    pub fn register(&mut self, gesture: Rc<dyn Gesture>) {
        self.gestures.insert(gesture.symbol().to_string(), gesture);
    }

    pub fn get(&self, symbol: &str) -> Option<Rc<dyn Gesture>> {
        self.gestures.get(symbol).cloned()
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.gestures.keys().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Fail unless at least `min` positional operands are present.
pub(crate) fn require_operands(operator: &str, args: &[Value], min: usize) -> EvalResult<()> {
    if args.len() < min {
        return Err(EvalError::Arity {
            operator: operator.to_string(),
            expected: min,
            actual: args.len(),
        });
    }
    Ok(())
}

/// The entity name `value` denotes.
pub(crate) fn entity_name(operator: &str, value: &Value) -> EvalResult<String> {
    value.as_name().ok_or_else(|| EvalError::UnnamedOperand {
        operator: operator.to_string(),
        operand: value.to_string(),
    })
}

/// Keyword arguments as attributes, minus `skip`, with the input's
/// intentions attached unless the caller supplied their own.
pub(crate) fn attributes(kwargs: &Keywords, skip: &[&str], intentions: &[String]) -> Attributes {
    let mut attrs: Attributes = kwargs
        .iter()
        .filter(|(k, _)| !skip.contains(k))
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    if !intentions.is_empty() && !attrs.contains_key(INTENTION_KEY) {
        let list = intentions.iter().map(Value::str).collect();
        attrs.insert(INTENTION_KEY.to_string(), Value::List(list));
    }
    attrs
}

/// Evaluate `arg` when it is a nested form; atoms pass through.
pub(crate) fn reduce(interp: &mut Interpreter, arg: &Value, intentions: &[String]) -> EvalResult<Value> {
    match arg {
        Value::List(_) => interp.evaluate(arg, intentions),
        atom => Ok(atom.clone()),
    }
}

/// One name, or a list of names when several.
pub(crate) fn one_or_many(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.swap_remove(0)
    } else {
        Value::List(values)
    }
}
