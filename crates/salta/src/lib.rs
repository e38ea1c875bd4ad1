//! # Salta
//!
//! A parser-combinator engine for arbitrary context-free grammars, including
//! left-recursive and ambiguous ones, built on an explicit work scheduler.
//!
//! ## Overview
//!
//! Salta interleaves parser activations on a trampoline and memoizes results
//! by (parser, position), so each unique subproblem is solved once:
//!
//! - **Left recursion**: memo entries fan every newly discovered success out
//!   to registered waiters, iterating grammars like `E = E '+' N | N` to a
//!   fixed point with no host-stack recursion
//! - **Ambiguity**: every successful parse from the start position can be
//!   delivered, not just the first
//! - **Best-error reporting**: the failure with the highest priority and the
//!   latest position wins the user-visible message
//! - **Grammar defects** (a repetition that stops making progress, an unbound
//!   recursive reference) are separated strictly from expected parse failures
//!
//! ## Quick Start
//!
//! A left-associative sum over a left-recursive grammar:
//!
//! ```rust
//! use salta::matchers::{literal, pattern};
//! use salta::{alt, chain, recursive, LazyParser, Value};
//!
//! let number = pattern("[0-9]+").unwrap();
//! let sum = recursive(|sum| {
//!     alt(vec![
//!         LazyParser::eager(chain(
//!             chain(sum, literal("+"), |lhs, _| lhs),
//!             number.clone(),
//!             |lhs, rhs| Value::from(format!("({lhs}+{rhs})")),
//!         )),
//!         number.clone().into(),
//!     ])
//! });
//!
//! let value = sum.consume().run("1+2+3").unwrap();
//! assert_eq!(value, Value::from("((1+2)+3)"));
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - Parser nodes, activation outcomes, trampoline, and driver
//! - [`combinator`] - `chain`, `seq`, `alt`, `optional`, `check`, `not`,
//!   `repeat`, and friends
//! - [`matchers`] - Leaf matchers for string input
//! - [`span`] - Half-open position ranges
//! - [`value`] - Semantic values produced by reducers
//! - [`error`] - Error types, metrics, and location rendering
//! - [`input`] - The input abstraction

pub mod combinator;
pub mod error;
pub mod input;
pub mod matchers;
pub mod parser;
pub mod span;
pub mod value;

// Re-export commonly used types
pub use combinator::{
    alt, always, chain, check, not, optional, optional_or, plus, recursive, repeat, seq, seq2,
    seq3, seq4, seq5, star,
};
pub use error::{GrammarError, ParseError, ParseMetrics};
pub use input::Input;
pub use parser::{lazy, LazyParser, Match, ParseConfig, ParseReport, Parser, ParserId, Step};
pub use span::Span;
pub use value::Value;
