//! Rich diagnostic error types for the LOGOS-κ interpreter.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source spans so users know exactly what
//! went wrong and how to fix it.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::axioms::ConfigError;
use crate::export::ExportError;

/// Top-level error type for the interpreter.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LogosError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Limit(#[from] LimitError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

// ---------------------------------------------------------------------------
// Syntax errors
// ---------------------------------------------------------------------------

/// Malformed tokens or structure. Fatal to the single input only.
#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("unterminated string literal starting at offset {offset}")]
    #[diagnostic(
        code(logos::syntax::unterminated_string),
        help("Close the string with a matching double quote. Use \\\" to embed a quote.")
    )]
    UnterminatedString {
        offset: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("string opens here")]
        span: SourceSpan,
    },

    #[error("unrecognized character '{ch}' at offset {offset}")]
    #[diagnostic(
        code(logos::syntax::unexpected_char),
        help(
            "Symbols start with a letter or an operator glyph (Α Λ Σ Ω ∇ Φ). \
             Keywords start with ':', strings are double-quoted, comments start with ';;'."
        )
    )]
    UnexpectedChar {
        ch: char,
        offset: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("not part of any token")]
        span: SourceSpan,
    },

    #[error("malformed number '{lexeme}' at offset {offset}")]
    #[diagnostic(
        code(logos::syntax::invalid_number),
        help("Numbers are integers like 42 or -7, or decimals with a single '.' like 3.14.")
    )]
    InvalidNumber {
        lexeme: String,
        offset: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("cannot be read as a number")]
        span: SourceSpan,
    },

    #[error("LOGOS-κ syntax error: unexpected closing paren ')'{context}")]
    #[diagnostic(
        code(logos::syntax::unexpected_close),
        help("Remove the extra ')' or add the matching '(' before it.")
    )]
    UnexpectedClose { context: String },

    #[error("LOGOS-κ syntax error: unclosed paren '('{context}")]
    #[diagnostic(
        code(logos::syntax::unclosed_list),
        help("Every '(' needs a matching ')'. Count the parens of the last expression.")
    )]
    UnclosedList { context: String },

    #[error("LOGOS-κ syntax error: list head cannot be a keyword: {head}{context}")]
    #[diagnostic(
        code(logos::syntax::keyword_head),
        help("Keywords pair with a value after the operator, as in (Α \"x\" :name \"y\").")
    )]
    KeywordHead { head: String, context: String },

    #[error("LOGOS-κ syntax error: list head must be an operator, got: {head}{context}")]
    #[diagnostic(
        code(logos::syntax::non_operator_head),
        help("Start every list with an operator glyph or alias, e.g. (Λ \"a\" \"b\") or (Lambda \"a\" \"b\").")
    )]
    NonOperatorHead { head: String, context: String },

    #[error("LOGOS-κ syntax error: lists nest {depth} deep, bound is {max}{context}")]
    #[diagnostic(
        code(logos::syntax::too_deep),
        help("Flatten the expression or raise `limits.max_parse_depth` in the axioms file.")
    )]
    TooDeep {
        depth: usize,
        max: usize,
        context: String,
    },
}

// ---------------------------------------------------------------------------
// Limit errors
// ---------------------------------------------------------------------------

/// A configured ceiling or content rule was violated.
///
/// The evaluator recovers these locally; they never reach the caller of
/// [`Interpreter::evaluate`](crate::eval::Interpreter::evaluate).
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum LimitError {
    #[error("recursion depth {depth} exceeds ceiling {max}")]
    #[diagnostic(
        code(logos::limit::recursion),
        help(
            "The expression nests deeper than the configured ceiling. \
             Flatten the expression or raise `limits.max_recursion_depth` in the axioms file."
        )
    )]
    RecursionDepth { depth: usize, max: usize },

    #[error("entity count {count} exceeds ceiling {max}")]
    #[diagnostic(
        code(logos::limit::population),
        help(
            "The context holds as many entities as it may. Export and reset the \
             context, or raise `limits.max_entities` in the axioms file."
        )
    )]
    EntityCount { count: usize, max: usize },

    #[error("absolutist phrase \"{phrase}\" matches banned pattern {pattern}")]
    #[diagnostic(
        code(logos::limit::absolutism),
        help("Rephrase without absolute claims. The pattern list lives under `[absolutism]` in the axioms file.")
    )]
    Absolutism { phrase: String, pattern: String },
}

// ---------------------------------------------------------------------------
// Evaluation errors
// ---------------------------------------------------------------------------

/// Errors raised while evaluating a single expression.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("malformed expression: {expr}")]
    #[diagnostic(
        code(logos::eval::type_error),
        help("An expression is an atom or a non-empty list whose head is an operator symbol.")
    )]
    Type { expr: String },

    #[error("{operator} expects at least {expected} operand(s), got {actual}")]
    #[diagnostic(
        code(logos::eval::arity),
        help("Check the operand count for {operator}. Keyword pairs do not count as operands.")
    )]
    Arity {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("{operator}: operand {operand} does not name an entity")]
    #[diagnostic(
        code(logos::eval::unnamed_operand),
        help("Entity names come from strings, symbols or numbers. Lists and nil cannot name an entity.")
    )]
    UnnamedOperand { operator: String, operand: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Limit(#[from] LimitError),
}

/// Convenience alias for functions returning interpreter results.
pub type LogosResult<T> = std::result::Result<T, LogosError>;

/// Result type for tokenizing and parsing.
pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;

/// Result type for evaluation.
pub type EvalResult<T> = std::result::Result<T, EvalError>;
