//! Σ: synthesis.

use crate::context::Attributes;
use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{Gesture, GestureState, OperatorKind, attributes, entity_name, require_operands};

/// `(Σ a b... :name n)`
///
/// Creates a synthesis entity, `Σ(a,b,…)` unless `:name` is given, typed
/// `synthesis`, and a `Σ` relation from every component to it. Returns the
/// synthesis name.
#[derive(Debug)]
pub struct Sigma {
    state: GestureState,
}

impl Sigma {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Sigma {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Sigma
    }

    fn execute(
        &self,
        interp: &mut Interpreter,
        args: &[Value],
        kwargs: &Keywords,
        intentions: &[String],
    ) -> EvalResult<Value> {
        self.state.bump();
        require_operands(self.symbol(), args, 2)?;

        let components = args
            .iter()
            .map(|a| entity_name(self.symbol(), a))
            .collect::<EvalResult<Vec<_>>>()?;
        let name = kwargs
            .get("name")
            .and_then(Value::as_name)
            .unwrap_or_else(|| format!("Σ({})", components.join(",")));

        let mut attrs = attributes(kwargs, &["name"], intentions);
        attrs.insert("type".to_string(), Value::str("synthesis"));
        attrs.insert(
            "components".to_string(),
            Value::List(components.iter().map(Value::str).collect()),
        );
        let ctx = interp.context_mut();
        ctx.ensure_room(components.iter().map(String::as_str).chain([name.as_str()]))?;
        ctx.add_entity(&name, attrs)?;
        for component in &components {
            ctx.add_relation(component, &name, "Σ", Attributes::new())?;
        }
        Ok(Value::Str(name))
    }

    fn invocations(&self) -> usize {
        self.state.invocations()
    }
}
