//! Ω: return.

use crate::context::entity::STATUS_RETURNED;
use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{Gesture, GestureState, OperatorKind, reduce};

/// `(Ω expr...)`
///
/// Special form. Evaluates its operands in order and returns the last
/// value. If that value names an entity, the entity is marked `returned`;
/// a name with no entity behind it is logged as an `unresolved_return`
/// tension.
#[derive(Debug)]
pub struct Omega {
    state: GestureState,
}

impl Omega {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Omega {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Omega
    }

    fn execute(
        &self,
        interp: &mut Interpreter,
        args: &[Value],
        _kwargs: &Keywords,
        intentions: &[String],
    ) -> EvalResult<Value> {
        self.state.bump();

        let mut last = Value::Nil;
        for arg in args {
            last = reduce(interp, arg, intentions)?;
        }

        if let Some(name) = last.as_name() {
            let ctx = interp.context_mut();
            if !ctx.set_lifecycle(&name, STATUS_RETURNED, intentions.to_vec()) {
                ctx.record_tension(
                    "unresolved_return",
                    &format!("Ω returned to '{name}', which does not exist"),
                    vec![name.clone()],
                );
            }
        }
        Ok(last)
    }

    fn invocations(&self) -> usize {
        self.state.invocations()
    }
}
