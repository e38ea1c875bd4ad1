//! # Driver
//!
//! Entry points that seed the trampoline and interpret what it produced.

use std::time::Instant;

use crate::error::{GrammarError, ParseError, ParseMetrics};
use crate::input::Input;
use crate::value::Value;

use super::engine::Trampoline;
use super::node::{LazyParser, Parser};
use super::outcome::{schedule, terminal, Match};

/// Limits and bounds for one parse invocation.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    /// Position the root parser starts at.
    pub start: usize,
    /// Successes ending past this position are discarded; defaults to the
    /// input length.
    pub end: Option<usize>,
    /// Abort with [`GrammarError::StepLimitExceeded`] after this many dequeued
    /// work items.
    pub max_steps: Option<usize>,
}

/// Everything one parse produced.
#[derive(Debug, Clone)]
pub struct ParseReport {
    /// Root successes in delivery order.
    pub matches: Vec<Match>,
    /// Best failure seen, present even when successes exist.
    pub failure: Option<Match>,
    pub metrics: ParseMetrics,
}

impl ParseReport {
    /// The single outcome [`Parser::execute`] would return.
    #[must_use]
    pub fn best(&self) -> Option<&Match> {
        self.matches.first().or(self.failure.as_ref())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.matches.is_empty()
    }
}

impl<I: Input + ?Sized> Parser<I> {
    /// Parse with explicit configuration.
    ///
    /// # Errors
    ///
    /// Grammar defects (non-progressing repetition, unbound recursion, an
    /// exhausted step budget) abort the parse.
    pub fn execute_with(
        &self,
        input: &I,
        config: &ParseConfig,
    ) -> Result<ParseReport, GrammarError> {
        let started = Instant::now();
        let end = config.end.unwrap_or_else(|| input.len()).min(input.len());
        let engine = Trampoline::new(input, end, config.max_steps);
        let completion = engine.drive(self, config.start)?;
        let mut metrics = completion.metrics;
        metrics.parse_time = started.elapsed();
        let failure = completion.failure.or_else(|| {
            if completion.matches.is_empty() {
                Some(Match::expected(config.start, &self.description()))
            } else {
                None
            }
        });
        Ok(ParseReport {
            matches: completion.matches,
            failure,
            metrics,
        })
    }

    /// Parse and return the single best outcome: the first success delivered,
    /// or the most informative failure.
    ///
    /// # Errors
    ///
    /// Grammar defects abort the parse.
    pub fn execute(&self, input: &I) -> Result<Match, GrammarError> {
        let report = self.execute_with(input, &ParseConfig::default())?;
        Ok(report
            .best()
            .cloned()
            .unwrap_or_else(|| Match::expected(0, &self.description())))
    }

    /// Parse and return every root success in delivery order; if there are
    /// none, the single best failure.
    ///
    /// # Errors
    ///
    /// Grammar defects abort the parse.
    pub fn execute_all(&self, input: &I) -> Result<Vec<Match>, GrammarError> {
        let report = self.execute_with(input, &ParseConfig::default())?;
        if report.matches.is_empty() {
            Ok(report.failure.into_iter().collect())
        } else {
            Ok(report.matches)
        }
    }

    /// Parse and unwrap the produced value.
    ///
    /// # Errors
    ///
    /// [`ParseError::Syntax`] when the input does not match, or a wrapped
    /// grammar defect.
    pub fn run(&self, input: &I) -> Result<Value, ParseError> {
        match self.execute(input)? {
            Match::Success { value, .. } => Ok(value),
            Match::Failure { span, message, .. } => Err(ParseError::Syntax { span, message }),
        }
    }

    /// Wrap this parser so a root match must consume the entire input.
    #[must_use]
    pub fn consume(&self) -> Parser<I> {
        let target = self.clone();
        Parser::build(
            "consume",
            true,
            vec![LazyParser::eager(self.clone())],
            |children| children.first().cloned().unwrap_or_default(),
            move |input: &I, index| {
                let len = input.len();
                Ok(schedule(target.clone(), index, move |outcome| {
                    match outcome {
                        Match::Success { span, .. } if span.end() == len => {
                            Ok(terminal(outcome.clone()))
                        }
                        Match::Success { span, .. } => Ok(terminal(Match::failure(
                            span.end(),
                            "Expected end of input",
                        ))),
                        Match::Failure { .. } => Ok(terminal(outcome.clone())),
                    }
                }))
            },
        )
    }
}
