// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # logos-kappa
//!
//! LOGOS-κ: a prefix-expression language whose programs act on a living
//! graph of entities and relations, under configurable safety ceilings.
//!
//! ## Architecture
//!
//! - **Tokenizer** (`lexer`): Unicode-aware scanner, extracts `;;` intentions
//! - **Parser** (`parser`): tokens → nested-list AST, empty forms elided
//! - **Evaluator** (`eval`): depth-guarded tree walk with limit recovery
//! - **Gestures** (`gesture`): the six operators `Α Λ Σ Ω ∇ Φ`
//! - **Graph context** (`context`): entities, relations, event log, coherence
//! - **Axioms** (`axioms`): ceilings, banned phrasings, blind spots, provenance
//!
//! ## Library usage
//!
//! ```no_run
//! use logos_kappa::axioms::Axioms;
//! use logos_kappa::context::Context;
//! use logos_kappa::eval::{CycleOptions, Interpreter};
//!
//! let context = Context::new("demo", Axioms::default()).unwrap();
//! let mut interp = Interpreter::new(context);
//! let outcome = interp
//!     .run_source("(Λ \"sun\" \"light\") (Α \"moon\")", &CycleOptions::default())
//!     .unwrap();
//! assert_eq!(outcome.results.len(), 2);
//! ```

pub mod axioms;
pub mod context;
pub mod error;
pub mod eval;
pub mod export;
pub mod gesture;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod value;
