//! # Error Types
//!
//! Error types and parse metrics.
//!
//! Two strictly separated categories:
//!
//! - [`GrammarError`]: programmer defects (a repetition that stops making
//!   progress, a recursive reference used before it was bound, an exhausted
//!   step budget). These abort the parse and surface as `Err`.
//! - [`ParseError`]: what [`Parser::run`](crate::parser::Parser::run)
//!   returns: a syntax failure carrying the best failure span and message the
//!   engine saw, or a wrapped grammar defect.
//!
//! Expected-input failures inside a parse are *not* errors; they are
//! [`Match::Failure`](crate::parser::Match) values that combinators like
//! `alt`, `optional`, and `not` recover from.
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich reporting with source snippets.

pub mod render;

use crate::span::Span;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Grammar defects: programmer errors that abort a parse outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("repeating parser isn't making progress at position {position}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(salta::repeat_stalled)))]
    RepeatNotProgressing { position: usize },

    #[error("recursive parser was used before its definition was supplied")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(salta::unbound_reference)))]
    UnboundReference,

    #[error("parse exceeded the configured budget of {limit} steps")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(salta::step_limit)))]
    StepLimitExceeded { limit: usize },
}

/// Errors surfaced by [`Parser::run`](crate::parser::Parser::run).
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// The input did not match; carries the best failure the engine saw.
    #[error("{message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(salta::no_match)))]
    Syntax {
        #[cfg_attr(feature = "diagnostics", label("expected here"))]
        span: Span,
        message: String,
    },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Grammar(#[from] GrammarError),
}

impl ParseError {
    /// Failure location, if the error carries one.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => Some(*span),
            Self::Grammar(_) => None,
        }
    }
}

/// Counters collected over one parse invocation.
#[derive(Debug, Clone, Default)]
pub struct ParseMetrics {
    /// Work items dequeued by the trampoline.
    pub steps: usize,
    /// Memo entries created, one per cacheable (parser, position) pair.
    pub cache_entries: usize,
    /// Activations answered from an existing memo entry.
    pub cache_hits: usize,
    /// Failure sweeps run after the work queue drained.
    pub sweeps: usize,
    /// Deepest chain of scheduled activations observed.
    pub max_depth: usize,
    /// Wall-clock time spent inside the engine.
    pub parse_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_messages() {
        let error = GrammarError::RepeatNotProgressing { position: 3 };
        assert!(error.to_string().contains("position 3"));

        let error = GrammarError::StepLimitExceeded { limit: 100 };
        assert!(error.to_string().contains("100"));
    }

    #[test]
    fn test_parse_error_span() {
        let error = ParseError::Syntax {
            span: Span::empty(5),
            message: String::from("Expected \"a\""),
        };
        assert_eq!(error.span(), Some(Span::empty(5)));
        assert_eq!(error.to_string(), "Expected \"a\"");
    }

    #[test]
    fn test_grammar_error_converts() {
        let error: ParseError = GrammarError::UnboundReference.into();
        assert_eq!(error.span(), None);
        assert!(error.to_string().contains("recursive parser"));
    }

    #[test]
    fn test_parse_metrics_default() {
        let metrics = ParseMetrics::default();
        assert_eq!(metrics.steps, 0);
        assert_eq!(metrics.cache_entries, 0);
        assert_eq!(metrics.cache_hits, 0);
        assert_eq!(metrics.parse_time, Duration::ZERO);
    }
}
