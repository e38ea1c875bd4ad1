//! Outcomes of parser activations and the continuation steps between them.
//!
//! A matcher does not return a single result: it returns a list of [`Step`]s
//! that may mix finished outcomes with pending sub-activations. Pending steps
//! carry a [`Handler`] continuation that receives every outcome the scheduled
//! parser eventually produces; this is how combinators sequence, choose, and
//! repeat without ever recursing on the host stack.

use smallvec::{smallvec, SmallVec};
use std::rc::Rc;

use crate::error::GrammarError;
use crate::input::Input;
use crate::span::Span;
use crate::value::Value;

use super::node::Parser;

/// Terminal outcome of running a parser at a position.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    /// The parser consumed `span` and produced `value`.
    Success { span: Span, value: Value },
    /// The parser rejected at `span.start()`. Failures are zero-width except
    /// for under-minimum repetition, which spans the consumed prefix.
    Failure {
        span: Span,
        message: String,
        priority: u8,
    },
}

impl Match {
    #[must_use]
    pub fn success(start: usize, end: usize, value: Value) -> Self {
        Self::Success {
            span: Span::new(start, end),
            value,
        }
    }

    #[must_use]
    pub fn failure(at: usize, message: impl Into<String>) -> Self {
        Self::Failure {
            span: Span::empty(at),
            message: message.into(),
            priority: 0,
        }
    }

    #[must_use]
    pub fn failure_with_priority(at: usize, message: impl Into<String>, priority: u8) -> Self {
        Self::Failure {
            span: Span::empty(at),
            message: message.into(),
            priority,
        }
    }

    /// Generic rejection: `"Expected {description}"`.
    #[must_use]
    pub fn expected(at: usize, description: &str) -> Self {
        Self::failure(at, format!("Expected {description}"))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Success { span, .. } | Self::Failure { span, .. } => *span,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            Self::Success { .. } => None,
        }
    }

    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Failure { priority, .. } => *priority,
            Self::Success { .. } => 0,
        }
    }

    /// Apply `f` to a success; failures pass through untouched.
    #[must_use]
    pub fn map(self, f: impl FnOnce(Span, Value) -> Self) -> Self {
        match self {
            Self::Success { span, value } => f(span, value),
            failure @ Self::Failure { .. } => failure,
        }
    }
}

/// Rank two failures: higher priority wins, then the later start position;
/// ties keep the incumbent.
#[must_use]
pub(crate) fn pick_failure(current: Match, candidate: Match) -> Match {
    let incumbent = (current.priority(), current.span().start());
    let challenger = (candidate.priority(), candidate.span().start());
    if challenger > incumbent {
        candidate
    } else {
        current
    }
}

/// One element of the list a matcher (or handler) returns.
pub enum Step<I: Input + ?Sized> {
    /// A finished outcome of the activation that produced this step.
    Terminal(Match),
    /// A pending sub-activation: run `parser` at `index`, feed each of its
    /// outcomes through `handler`.
    Pending {
        parser: Parser<I>,
        index: usize,
        handler: Handler<I>,
    },
}

/// The list of steps produced by one activation; usually one or two items.
pub type Steps<I> = SmallVec<[Step<I>; 2]>;

/// Continuation invoked with each outcome of a scheduled sub-parser.
pub type Handler<I> = Rc<dyn Fn(&Match) -> Result<Steps<I>, GrammarError>>;

/// Single terminal step.
#[must_use]
pub fn terminal<I: Input + ?Sized>(outcome: Match) -> Steps<I> {
    smallvec![Step::Terminal(outcome)]
}

/// Schedule `parser` at `index` with an explicit continuation.
#[must_use]
pub fn schedule<I: Input + ?Sized>(
    parser: Parser<I>,
    index: usize,
    handler: impl Fn(&Match) -> Result<Steps<I>, GrammarError> + 'static,
) -> Steps<I> {
    smallvec![Step::Pending {
        parser,
        index,
        handler: Rc::new(handler),
    }]
}

/// Schedule `parser` and pass its outcomes through unchanged.
#[must_use]
pub fn defer<I: Input + ?Sized>(parser: Parser<I>, index: usize) -> Steps<I> {
    schedule(parser, index, |outcome| Ok(terminal(outcome.clone())))
}

/// Schedule `parser`; failures pass through, successes feed `on_success`.
#[must_use]
pub fn schedule_map<I: Input + ?Sized>(
    parser: Parser<I>,
    index: usize,
    on_success: impl Fn(Span, &Value) -> Result<Steps<I>, GrammarError> + 'static,
) -> Steps<I> {
    schedule(parser, index, move |outcome| match outcome {
        Match::Success { span, value } => on_success(*span, value),
        failure @ Match::Failure { .. } => Ok(terminal(failure.clone())),
    })
}
