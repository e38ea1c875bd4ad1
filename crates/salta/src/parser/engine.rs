//! # Trampoline
//!
//! The work-stack executor behind every parse. Matchers never call each other
//! directly: they return [`Steps`](super::outcome::Steps) mixing finished
//! outcomes with pending sub-activations, and the trampoline decides when each
//! pending activation runs. Host stack depth stays constant no matter how deep
//! the grammar is.
//!
//! Cacheable activations are memoized by `(parser id, position)`. A memo entry
//! collects every distinct success for its key and fans each one out to all
//! registered waiters, including waiters registered before the success
//! existed. That replay is what drives left-recursive grammars to a fixed
//! point.
//! Failures are sticky: they are withheld until the queue drains, then swept
//! to waiters exactly once. Delivering a cached failure eagerly would cut the
//! fixed-point iteration short.

use hashbrown::HashMap;
use std::rc::Rc;

use crate::error::{GrammarError, ParseMetrics};
use crate::input::Input;

use super::node::{Parser, ParserId};
use super::outcome::{pick_failure, Handler, Match, Step, Steps};

type CacheKey = (ParserId, usize);

/// Where the terminal outcomes of an activation are routed.
enum Sink<I: Input + ?Sized> {
    /// Outcomes of the root activation: collected for the caller.
    Root,
    /// Outcomes of a cacheable activation: recorded in its memo entry and
    /// fanned out to waiters.
    Entry(CacheKey),
    /// Outcomes of a scheduled sub-activation: fed through a combinator
    /// continuation whose own steps route to `parent`.
    Continue {
        handler: Handler<I>,
        parent: SinkRef<I>,
    },
}

type SinkRef<I> = Rc<Sink<I>>;

enum Task<I: Input + ?Sized> {
    Activate {
        parser: Parser<I>,
        index: usize,
        sink: SinkRef<I>,
        depth: usize,
    },
    Deliver {
        sink: SinkRef<I>,
        outcome: Match,
        depth: usize,
    },
}

/// Memo entry for one cacheable (parser, position) pair.
struct MemoEntry<I: Input + ?Sized> {
    /// Distinct successes seen so far, deduplicated by `(end, value)`.
    results: Vec<Match>,
    /// Continuations to feed every success, in registration order.
    waiters: Vec<SinkRef<I>>,
    /// Sticky failure, retained only while no success exists.
    failure: Option<Match>,
    /// Number of waiters already given the failure during sweeps.
    failed_waiters: usize,
}

impl<I: Input + ?Sized> MemoEntry<I> {
    fn new() -> Self {
        Self {
            results: Vec::new(),
            waiters: Vec::new(),
            failure: None,
            failed_waiters: 0,
        }
    }
}

/// Everything the engine produced by the time the work ran dry.
pub(crate) struct Completion {
    pub matches: Vec<Match>,
    pub failure: Option<Match>,
    pub metrics: ParseMetrics,
}

pub(crate) struct Trampoline<'i, I: Input + ?Sized> {
    input: &'i I,
    end: usize,
    max_steps: Option<usize>,
    stack: Vec<Task<I>>,
    cache: HashMap<CacheKey, MemoEntry<I>, ahash::RandomState>,
    /// Cache keys in creation order, so sweeps are deterministic.
    entry_order: Vec<CacheKey>,
    root_matches: Vec<Match>,
    best_failure: Option<Match>,
    metrics: ParseMetrics,
}

impl<'i, I: Input + ?Sized> Trampoline<'i, I> {
    pub(crate) fn new(input: &'i I, end: usize, max_steps: Option<usize>) -> Self {
        Self {
            input,
            end,
            max_steps,
            stack: Vec::new(),
            cache: HashMap::with_hasher(ahash::RandomState::new()),
            entry_order: Vec::new(),
            root_matches: Vec::new(),
            best_failure: None,
            metrics: ParseMetrics::default(),
        }
    }

    /// Drive `root` at `start` until no scheduled work remains.
    ///
    /// The root matcher is invoked directly so sibling alternatives with equal
    /// results each reach the caller; every interior activation goes through
    /// the memo cache.
    pub(crate) fn drive(mut self, root: &Parser<I>, start: usize) -> Result<Completion, GrammarError> {
        let steps = root.run_matcher(self.input, start)?;
        self.push_steps(steps, Rc::new(Sink::Root), 0);
        loop {
            self.drain()?;
            if !self.sweep_failures() {
                break;
            }
            self.metrics.sweeps += 1;
        }
        Ok(Completion {
            matches: self.root_matches,
            failure: self.best_failure,
            metrics: self.metrics,
        })
    }

    fn drain(&mut self) -> Result<(), GrammarError> {
        while let Some(task) = self.stack.pop() {
            self.metrics.steps += 1;
            if let Some(limit) = self.max_steps {
                if self.metrics.steps > limit {
                    return Err(GrammarError::StepLimitExceeded { limit });
                }
            }
            match task {
                Task::Activate {
                    parser,
                    index,
                    sink,
                    depth,
                } => {
                    self.metrics.max_depth = self.metrics.max_depth.max(depth);
                    self.activate(&parser, index, sink, depth)?;
                }
                Task::Deliver {
                    sink,
                    outcome,
                    depth,
                } => self.deliver(&sink, outcome, depth)?,
            }
        }
        Ok(())
    }

    /// Push a step list so that list order is processed first.
    fn push_steps(&mut self, steps: Steps<I>, origin: SinkRef<I>, depth: usize) {
        for step in steps.into_iter().rev() {
            match step {
                Step::Terminal(outcome) => {
                    self.stack.push(Task::Deliver {
                        sink: Rc::clone(&origin),
                        outcome,
                        depth,
                    });
                }
                Step::Pending {
                    parser,
                    index,
                    handler,
                } => {
                    let sink = Rc::new(Sink::Continue {
                        handler,
                        parent: Rc::clone(&origin),
                    });
                    self.stack.push(Task::Activate {
                        parser,
                        index,
                        sink,
                        depth: depth + 1,
                    });
                }
            }
        }
    }

    fn activate(
        &mut self,
        parser: &Parser<I>,
        index: usize,
        sink: SinkRef<I>,
        depth: usize,
    ) -> Result<(), GrammarError> {
        if !parser.is_cacheable() {
            let steps = parser.run_matcher(self.input, index)?;
            self.push_steps(steps, sink, depth);
            return Ok(());
        }
        let key = (parser.id(), index);
        let replay = match self.cache.get_mut(&key) {
            Some(entry) => {
                self.metrics.cache_hits += 1;
                // Even a completed entry takes the waiter: a later fixed-point
                // round may still discover new successes for this key.
                entry.waiters.push(Rc::clone(&sink));
                Some(entry.results.clone())
            }
            None => None,
        };
        match replay {
            Some(results) => {
                for outcome in results.into_iter().rev() {
                    self.stack.push(Task::Deliver {
                        sink: Rc::clone(&sink),
                        outcome,
                        depth,
                    });
                }
            }
            None => {
                let mut entry = MemoEntry::new();
                entry.waiters.push(Rc::clone(&sink));
                self.cache.insert(key, entry);
                self.entry_order.push(key);
                self.metrics.cache_entries += 1;
                let steps = parser.run_matcher(self.input, index)?;
                self.push_steps(steps, Rc::new(Sink::Entry(key)), depth);
            }
        }
        Ok(())
    }

    fn deliver(&mut self, sink: &Sink<I>, outcome: Match, depth: usize) -> Result<(), GrammarError> {
        match sink {
            Sink::Root => {
                self.record_root(outcome);
                Ok(())
            }
            Sink::Continue { handler, parent } => {
                let steps = handler(&outcome)?;
                self.push_steps(steps, Rc::clone(parent), depth);
                Ok(())
            }
            Sink::Entry(key) => {
                self.record_cached(*key, outcome, depth);
                Ok(())
            }
        }
    }

    fn record_root(&mut self, outcome: Match) {
        match outcome {
            success @ Match::Success { .. } => {
                if success.span().end() <= self.end {
                    self.root_matches.push(success);
                }
            }
            failure @ Match::Failure { .. } => {
                self.best_failure = Some(match self.best_failure.take() {
                    Some(current) => pick_failure(current, failure),
                    None => failure,
                });
            }
        }
    }

    fn record_cached(&mut self, key: CacheKey, outcome: Match, depth: usize) {
        let mut fan_out = None;
        if let Some(entry) = self.cache.get_mut(&key) {
            match outcome {
                Match::Success { span, value } => {
                    let duplicate = entry
                        .results
                        .iter()
                        .any(|seen| seen.span().end() == span.end() && seen.value() == Some(&value));
                    if !duplicate {
                        let outcome = Match::Success { span, value };
                        entry.results.push(outcome.clone());
                        fan_out = Some((entry.waiters.clone(), outcome));
                    }
                }
                failure @ Match::Failure { .. } => {
                    if entry.results.is_empty() {
                        entry.failure = Some(match entry.failure.take() {
                            Some(current) => pick_failure(current, failure),
                            None => failure,
                        });
                    }
                }
            }
        }
        if let Some((waiters, outcome)) = fan_out {
            // Waiters hear about the new success in registration order.
            for waiter in waiters.iter().rev() {
                self.stack.push(Task::Deliver {
                    sink: Rc::clone(waiter),
                    outcome: outcome.clone(),
                    depth,
                });
            }
        }
    }

    /// Deliver sticky failures of success-less entries to waiters that have
    /// not heard them yet. Handlers fed a failure may schedule fresh work
    /// (`alt` accounting, `not` inversion), so `drive` loops drain-and-sweep
    /// until a sweep makes no progress.
    fn sweep_failures(&mut self) -> bool {
        let mut deliveries = Vec::new();
        for key in &self.entry_order {
            let Some(entry) = self.cache.get_mut(key) else {
                continue;
            };
            if !entry.results.is_empty() {
                continue;
            }
            let Some(failure) = entry.failure.clone() else {
                continue;
            };
            while entry.failed_waiters < entry.waiters.len() {
                deliveries.push((
                    Rc::clone(&entry.waiters[entry.failed_waiters]),
                    failure.clone(),
                ));
                entry.failed_waiters += 1;
            }
        }
        let progressed = !deliveries.is_empty();
        for (sink, outcome) in deliveries.into_iter().rev() {
            self.stack.push(Task::Deliver {
                sink,
                outcome,
                depth: 0,
            });
        }
        progressed
    }
}
