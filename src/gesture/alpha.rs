//! Α: collapse. Names its operands into entities.

use crate::error::EvalResult;
use crate::eval::Interpreter;
use crate::value::{Keywords, Value};

use super::{
    Gesture, GestureState, OperatorKind, attributes, entity_name, one_or_many, reduce,
    require_operands,
};

/// `(Α name... :key value...)`
///
/// Special form. Nested operands are evaluated first and their results
/// named. Keyword arguments become attributes of every created entity.
/// Returns the name, or the list of names.
#[derive(Debug)]
pub struct Alpha {
    state: GestureState,
}

impl Alpha {
    pub fn new(symbol: &str) -> Self {
        Self {
            state: GestureState::new(symbol),
        }
    }
}

impl Gesture for Alpha {
    fn symbol(&self) -> &str {
        self.state.symbol()
    }

    fn kind(&self) -> OperatorKind {
        OperatorKind::Alpha
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

        let mut names = Vec::with_capacity(args.len());
        for arg in args {
            let value = reduce(interp, arg, intentions)?;
            let name = entity_name(self.symbol(), &value)?;
            let attrs = attributes(kwargs, &[], intentions);
            names.push(Value::Str(interp.context_mut().add_entity(&name, attrs)?));
        }
        Ok(one_or_many(names))
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
        Interpreter::new(Context::new("alpha", Axioms::default()).unwrap())
    }

    #[test]
    fn names_each_operand() {
        let mut interp = interp();
        let alpha = Alpha::new("Α");
        let out = alpha
            .execute(
                &mut interp,
                &[Value::str("sun"), Value::Int(7)],
                &Keywords::new(),
                &[],
            )
            .unwrap();
        assert_eq!(out, Value::List(vec![Value::str("sun"), Value::str("7")]));
        assert!(interp.context().contains("sun"));
        assert!(interp.context().contains("7"));
        assert_eq!(alpha.invocations(), 1);
    }

    #[test]
    fn keywords_become_attributes() {
        let mut interp = interp();
        let mut kw = Keywords::new();
        kw.insert("color", Value::str("gold"));
        Alpha::new("Alpha")
            .execute(&mut interp, &[Value::str("sun")], &kw, &[])
            .unwrap();
        let sun = interp.context().entity("sun").unwrap();
        assert_eq!(sun.attribute("color"), Some(Value::str("gold")));
    }

    #[test]
    fn requires_an_operand() {
        let mut interp = interp();
        let err = Alpha::new("Α")
            .execute(&mut interp, &[], &Keywords::new(), &[])
            .unwrap_err();
        assert!(matches!(err, EvalError::Arity { expected: 1, actual: 0, .. }));
    }
}
