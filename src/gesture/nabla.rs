//! ∇: enrichment.

use crate::context::Attributes;
use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{Gesture, GestureState, OperatorKind, attributes, entity_name, require_operands};

/// `(∇ target source... :key value...)`
///
/// Merges the keyword arguments into `target`, creating it if needed. Each
/// further operand is linked to the target with a `∇` relation. Returns the
/// target name.
#[derive(Debug)]
pub struct Nabla {
    state: GestureState,
}

impl Nabla {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Nabla {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Nabla
    }

    fn execute(
        &self,
        interp: &mut Interpreter,
        args: &[Value],
        kwargs: &Keywords,
        intentions: &[String],
    ) -> EvalResult<Value> {
        self.state.bump();
        require_operands(self.symbol(), args, 1)?;

        let target = entity_name(self.symbol(), &args[0])?;
        let sources = args[1..]
            .iter()
            .map(|a| entity_name(self.symbol(), a))
            .collect::<EvalResult<Vec<_>>>()?;

        let ctx = interp.context_mut();
        ctx.ensure_room(sources.iter().map(String::as_str).chain([target.as_str()]))?;
        ctx.enrich(&target, attributes(kwargs, &[], intentions))?;
        for source in &sources {
            ctx.add_relation(source, &target, "∇", Attributes::new())?;
        }
        Ok(Value::Str(target))
    }

    fn invocations(&self) -> usize {
        self.state.invocations()
    }
}
