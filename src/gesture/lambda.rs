//! Λ: connection.

use crate::context::DEFAULT_RELATION;
use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{
    Gesture, GestureState, OperatorKind, attributes, entity_name, one_or_many, require_operands,
};

/// `(Λ a b c... :type t :key value...)`
///
/// Relates each consecutive pair `a→b`, `b→c`. `:type` overrides the
/// relation type; other keywords become relation attributes. Returns the
/// edge id, or the list of ids.
#[derive(Debug)]
pub struct Lambda {
    state: GestureState,
}

impl Lambda {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Lambda {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Lambda
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

        let kind = kwargs
            .get("type")
            .and_then(Value::as_name)
            .unwrap_or_else(|| DEFAULT_RELATION.to_string());
        let names = args
            .iter()
            .map(|a| entity_name(self.symbol(), a))
            .collect::<EvalResult<Vec<_>>>()?;

        interp
            .context()
            .ensure_room(names.iter().map(String::as_str))?;

        let mut ids = Vec::with_capacity(names.len() - 1);
        for pair in names.windows(2) {
            let attrs = attributes(kwargs, &["type"], intentions);
            let id = interp
                .context_mut()
                .add_relation(&pair[0], &pair[1], &kind, attrs)?;
            ids.push(Value::Str(id));
        }
        Ok(one_or_many(ids))
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
    use crate::error::EvalError;

    fn interp() -> Interpreter {
        Interpreter::new(Context::new("lambda", Axioms::default()).unwrap())
    }

    #[test]
    fn chains_consecutive_pairs() {
        let mut interp = interp();
        let out = Lambda::new("Λ")
            .execute(
                &mut interp,
                &[Value::str("a"), Value::str("b"), Value::str("c")],
                &Keywords::new(),
                &[],
            )
            .unwrap();
        assert_eq!(
            out,
            Value::List(vec![Value::str("a→b(Λ)"), Value::str("b→c(Λ)")])
        );
        assert_eq!(interp.context().edge_count(), 2);
    }

    #[test]
    fn type_keyword_sets_relation_type() {
        let mut interp = interp();
        let mut kw = Keywords::new();
        kw.insert("type", Value::str("causes"));
        kw.insert("strength", Value::Float(0.5));
        let out = Lambda::new("Lambda")
            .execute(&mut interp, &[Value::str("rain"), Value::str("flood")], &kw, &[])
            .unwrap();
        assert_eq!(out, Value::str("rain→flood(causes)"));
        let rel = interp.context().relation("rain", "flood").unwrap();
        assert_eq!(rel.kind, "causes");
        assert_eq!(rel.attributes.get("strength"), Some(&Value::Float(0.5)));
        assert!(!rel.attributes.contains_key("type"));
    }

    #[test]
    fn chain_past_the_ceiling_leaves_graph_untouched() {
        let ctx = Context::new("lambda", Axioms::default().with_max_entities(8)).unwrap();
        let mut interp = Interpreter::new(ctx);
        let err = Lambda::new("Λ")
            .execute(
                &mut interp,
                &[Value::str("a"), Value::str("b"), Value::str("c")],
                &Keywords::new(),
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, EvalError::Limit(_)));
        let ctx = interp.context();
        assert_eq!(ctx.node_count(), 6);
        assert_eq!(ctx.edge_count(), 0);
    }

    #[test]
    fn needs_two_operands() {
        let mut interp = interp();
        let err = Lambda::new("Λ")
            .execute(&mut interp, &[Value::str("a")], &Keywords::new(), &[])
            .unwrap_err();
        assert!(matches!(err, EvalError::Arity { expected: 2, actual: 1, .. }));
    }
}
