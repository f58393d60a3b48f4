//! Parser: token stream → nested-list AST.
//!
//! Grammar:
//!
//! ```text
//! expr ::= atom | '(' expr* ')'
//! atom ::= SYMBOL | STRING | NUMBER | KEYWORD
//! ```
//!
//! Empty lists `()` produce no value at all, recursively, so `(Λ () a)` and
//! `(Λ a)` parse to the same tree. A list's head must be an operator-shaped
//! string; whether the operator exists is decided at evaluation time.
//!
//! Nesting is bounded: a list deeper than the configured parse depth is a
//! [`SyntaxError::TooDeep`], reported before the parser's own stack runs out.

use crate::axioms::Axioms;
use crate::error::{LogosResult, SyntaxError, SyntaxResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

/// Sources up to this many lines are echoed in syntax errors.
const ECHO_MAX_LINES: usize = 5;

/// Nesting bound when no axioms are supplied.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Recursive-descent parser over a token slice.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    source: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            source: None,
        }
    }

    /// Bound the list nesting depth.
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max.max(1);
        self
    }

    /// Attach the original source so errors can quote it.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// Parse every top-level expression. Elided `()` forms are skipped.
    pub fn parse(&mut self) -> SyntaxResult<Vec<Value>> {
        let mut expressions = Vec::new();
        while self.pos < self.tokens.len() {
            if let Some(expr) = self.parse_expr()? {
                expressions.push(expr);
            }
        }
        Ok(expressions)
    }

    fn parse_expr(&mut self) -> SyntaxResult<Option<Value>> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Ok(None);
        };
        match token.kind {
            TokenKind::LParen => self.parse_list(),
            TokenKind::RParen => Err(SyntaxError::UnexpectedClose {
                context: self.context(),
            }),
            TokenKind::String | TokenKind::Number | TokenKind::Symbol | TokenKind::Keyword => {
                self.pos += 1;
                Ok(Some(token.value.clone()))
            }
        }
    }

    fn parse_list(&mut self) -> SyntaxResult<Option<Value>> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::TooDeep {
                depth: self.depth + 1,
                max: self.max_depth,
                context: self.context(),
            });
        }
        self.depth += 1;
        let list = self.parse_list_body();
        self.depth -= 1;
        list
    }

    fn parse_list_body(&mut self) -> SyntaxResult<Option<Value>> {
        self.pos += 1; // '('
        let mut items = Vec::new();

        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind != TokenKind::RParen)
        {
            if let Some(expr) = self.parse_expr()? {
                items.push(expr);
            }
        }

        if self.pos >= self.tokens.len() {
            return Err(SyntaxError::UnclosedList {
                context: self.context(),
            });
        }
        self.pos += 1; // ')'

        let Some(head) = items.first() else {
            return Ok(None);
        };
        match head {
            head if head.is_keyword() => Err(SyntaxError::KeywordHead {
                head: head.to_string(),
                context: self.context(),
            }),
            Value::Str(_) => Ok(Some(Value::List(items))),
            other => Err(SyntaxError::NonOperatorHead {
                head: other.to_string(),
                context: self.context(),
            }),
        }
    }

    /// Error context: the numbered source when short, else its length.
    fn context(&self) -> String {
        let Some(source) = self.source else {
            return String::new();
        };
        let lines: Vec<&str> = source.lines().collect();
        if lines.len() <= ECHO_MAX_LINES {
            let numbered: Vec<String> = lines
                .iter()
                .enumerate()
                .map(|(i, line)| format!("  {}: {line}", i + 1))
                .collect();
            format!("\nSource:\n{}", numbered.join("\n"))
        } else {
            format!("\nTotal length: {} characters", source.chars().count())
        }
    }
}

/// A parsed input: its expressions plus the intentions from its comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub expressions: Vec<Value>,
    pub intentions: Vec<String>,
}

/// Validate, tokenize and parse `source` in one step.
pub fn parse_program(source: &str, name: &str, axioms: &Axioms) -> LogosResult<Program> {
    let lexer = Lexer::new(source, axioms)?.with_name(name);
    let tokens = lexer.tokenize()?;
    let expressions = Parser::new(&tokens)
        .with_max_depth(axioms.max_parse_depth())
        .with_source(source)
        .parse()?;
    Ok(Program {
        expressions,
        intentions: lexer.intentions().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogosError;

    fn parse(source: &str) -> SyntaxResult<Vec<Value>> {
        let axioms = Axioms::default();
        let lexer = Lexer::new(source, &axioms).unwrap();
        let tokens = lexer.tokenize().unwrap();
        Parser::new(&tokens).with_source(source).parse()
    }

    fn list(items: &[Value]) -> Value {
        Value::List(items.to_vec())
    }

    #[test]
    fn parses_nested_lists() {
        let exprs = parse("(Λ (Α \"x\") 3)").unwrap();
        assert_eq!(
            exprs,
            [list(&[
                Value::str("Λ"),
                list(&[Value::str("Α"), Value::str("x")]),
                Value::Int(3),
            ])]
        );
    }

    #[test]
    fn empty_lists_elide_recursively() {
        assert_eq!(parse("(Λ () a)").unwrap(), parse("(Λ a)").unwrap());
        assert_eq!(parse("(Λ (()) a (() ()))").unwrap(), parse("(Λ a)").unwrap());
        assert!(parse("() (())").unwrap().is_empty());
    }

    #[test]
    fn top_level_atoms_are_expressions() {
        let exprs = parse("\"hello\" 42 Σ").unwrap();
        assert_eq!(exprs, [Value::str("hello"), Value::Int(42), Value::str("Σ")]);
    }

    #[test]
    fn unknown_operators_parse() {
        let exprs = parse("(whatever 1 2)").unwrap();
        assert_eq!(exprs.len(), 1);
    }

    #[test]
    fn keyword_head_rejected() {
        let err = parse("(:name \"x\")").unwrap_err();
        assert!(matches!(err, SyntaxError::KeywordHead { ref head, .. } if head == ":name"));
    }

    #[test]
    fn non_string_heads_rejected() {
        assert!(matches!(
            parse("(42 a)").unwrap_err(),
            SyntaxError::NonOperatorHead { .. }
        ));
        assert!(matches!(
            parse("((Λ a b) c)").unwrap_err(),
            SyntaxError::NonOperatorHead { .. }
        ));
    }

    #[test]
    fn stray_close_paren_fails() {
        assert!(matches!(
            parse("(Α a))").unwrap_err(),
            SyntaxError::UnexpectedClose { .. }
        ));
    }

    #[test]
    fn unclosed_list_fails() {
        assert!(matches!(
            parse("(Λ a (Α b)").unwrap_err(),
            SyntaxError::UnclosedList { .. }
        ));
    }

    #[test]
    fn short_source_is_echoed_with_line_numbers() {
        let err = parse("(Α a)\n)").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("  1: (Α a)"), "{msg}");
        assert!(msg.contains("  2: )"), "{msg}");
    }

    #[test]
    fn long_source_reports_length_only() {
        let source = "(Α a)\n(Α b)\n(Α c)\n(Α d)\n(Α e)\n(Α f";
        let err = parse(source).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&format!("Total length: {} characters", source.chars().count())));
        assert!(!msg.contains("1: "));
    }

    fn nested(depth: usize) -> String {
        format!("{}\"x\"{}", "(Ω ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn nesting_at_the_bound_parses() {
        let axioms = Axioms::default().with_max_parse_depth(32);
        let program = parse_program(&nested(32), "<test>", &axioms).unwrap();
        assert_eq!(program.expressions.len(), 1);
    }

    #[test]
    fn nesting_past_the_bound_is_too_deep() {
        let axioms = Axioms::default().with_max_parse_depth(32);
        let err = parse_program(&nested(33), "<test>", &axioms).unwrap_err();
        assert!(matches!(
            err,
            LogosError::Syntax(SyntaxError::TooDeep { depth: 33, max: 32, .. })
        ));
    }

    #[test]
    fn very_deep_input_fails_without_exhausting_the_stack() {
        for depth in [5_000, 200_000] {
            let err = parse_program(&nested(depth), "<test>", &Axioms::default()).unwrap_err();
            assert!(matches!(
                err,
                LogosError::Syntax(SyntaxError::TooDeep { max: 256, .. })
            ));
        }
    }

    #[test]
    fn parser_resets_depth_between_expressions() {
        let source = format!("{} {}", nested(3), nested(3));
        let axioms = Axioms::default().with_max_parse_depth(3);
        let program = parse_program(&source, "<test>", &axioms).unwrap();
        assert_eq!(program.expressions.len(), 2);
    }

    #[test]
    fn parse_program_collects_intentions() {
        let program = parse_program("(Α \"c\") ;; name it", "<test>", &Axioms::default()).unwrap();
        assert_eq!(program.expressions.len(), 1);
        assert_eq!(program.intentions, ["name it"]);
    }

    #[test]
    fn parse_program_surfaces_limit_errors() {
        let err = parse_program("(Α \"the final truth\")", "<test>", &Axioms::default()).unwrap_err();
        assert!(matches!(err, LogosError::Limit(_)));
    }
}
