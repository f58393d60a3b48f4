//! Φ: dialogue with the context.

use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{Gesture, GestureState, OperatorKind, reduce};

/// `(Φ prompt...)`
///
/// Special form. The operands, nested forms evaluated, make up the prompt.
/// The response is a plain account of the context's state; the exchange is
/// archived with the current coherence as its score.
#[derive(Debug)]
pub struct Phi {
    state: GestureState,
}

impl Phi {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Phi {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Phi
    }

    fn execute(
        &self,
        interp: &mut Interpreter,
        args: &[Value],
        _kwargs: &Keywords,
        intentions: &[String],
    ) -> EvalResult<Value> {
        self.state.bump();

        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(reduce(interp, arg, intentions)?.to_string());
        }
        let prompt = parts.join(" ");

        let ctx = interp.context_mut();
        let coherence = ctx.measure_coherence();
        let unresolved: Vec<&str> = ctx.blind_spots().keys().map(String::as_str).collect();
        let response = format!(
            "Φ[{prompt}]: '{}' holds {} entities and {} relations; coherence {coherence:.2} ({}); \
             unresolved: {}",
            ctx.name(),
            ctx.node_count(),
            ctx.edge_count(),
            ctx.coherence_trend(),
            unresolved.join(", "),
        );
        ctx.record_dialogue(&prompt, &response, intentions.to_vec());
        Ok(Value::Str(response))
    }

    fn invocations(&self) -> usize {
        self.state.invocations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axioms::Axioms;
    use crate::context::Context;

    #[test]
    fn records_a_scored_dialogue() {
        let mut interp = Interpreter::new(Context::new("phi", Axioms::default()).unwrap());
        let out = Phi::new("Φ")
            .execute(
                &mut interp,
                &[Value::str("what"), Value::str("is")],
                &Keywords::new(),
                &["ask".to_string()],
            )
            .unwrap();
        let text = out.as_str().unwrap();
        assert!(text.starts_with("Φ[what is]"));
        assert!(text.contains("6 entities"));
        assert!(text.contains("chaos"));

        let ctx = interp.context();
        assert_eq!(ctx.dialogues().len(), 1);
        assert_eq!(ctx.dialogues()[0].prompt, "what is");
        assert_eq!(ctx.dialogues()[0].intentions, ["ask"]);
        assert_eq!(ctx.dialogues()[0].score.overall, 0.0);
    }
}
