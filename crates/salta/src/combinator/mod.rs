//! # Combinator algebra
//!
//! The composition operators of the engine: sequencing ([`chain`], [`seq`]),
//! alternation ([`alt`]), optionality ([`optional`], [`optional_or`]),
//! lookaround ([`check`], [`not`]), repetition ([`repeat`], [`star`],
//! [`plus`]), and the cyclic knot-tier [`recursive`].
//!
//! Every combinator compiles down to a matcher returning
//! [`Steps`](crate::parser::Steps) of scheduled sub-activations with
//! continuations, so composition never consumes host stack at parse time.
//! Reducers passed to [`chain`] and [`Parser::map`] must be pure: results are
//! memoized by position.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::GrammarError;
use crate::input::Input;
use crate::parser::node::{describe_weak, LazyParser, Parser, ParserCore};
use crate::parser::outcome::{
    defer, pick_failure, schedule, schedule_map, terminal, Match, Step, Steps,
};
use crate::span::Span;
use crate::value::Value;

/// Sequence two parsers and combine their values.
///
/// A failure of the second parser is reported at its own position, not at the
/// chain's start; the combined span covers both children.
#[must_use]
pub fn chain<I: Input + ?Sized>(
    first: impl Into<LazyParser<I>>,
    second: impl Into<LazyParser<I>>,
    combine: impl Fn(Value, Value) -> Value + 'static,
) -> Parser<I> {
    let first = first.into();
    let second = second.into();
    let combine = Rc::new(combine);
    let head_ref = first.clone();
    let tail_ref = second.clone();
    Parser::build(
        "chain",
        true,
        vec![first, second],
        |children| format!("{} {}", children[0], children[1]),
        move |_input, index| {
            let head = head_ref.resolve()?;
            let tail_ref = tail_ref.clone();
            let combine = Rc::clone(&combine);
            Ok(schedule_map(head, index, move |head_span, head_value| {
                let tail = tail_ref.resolve()?;
                let head_value = head_value.clone();
                let combine = Rc::clone(&combine);
                Ok(schedule_map(
                    tail,
                    head_span.end(),
                    move |tail_span, tail_value| {
                        Ok(terminal(Match::Success {
                            span: head_span.merge(tail_span),
                            value: combine(head_value.clone(), tail_value.clone()),
                        }))
                    },
                ))
            }))
        },
    )
}

/// Succeed without consuming input, producing `value`.
///
/// Cacheable only for primitive values, the same rule as [`optional_or`]
/// defaults.
#[must_use]
pub fn always<I: Input + ?Sized>(value: Value) -> Parser<I> {
    let cacheable = value.is_primitive();
    Parser::build(
        "always",
        cacheable,
        Vec::new(),
        |_| String::from("nothing"),
        move |_input, index| Ok(terminal(Match::success(index, index, value.clone()))),
    )
}

/// Sequence any number of parsers into a list value.
///
/// Zero parsers succeed zero-width with an empty list.
#[must_use]
pub fn seq<I, P>(parsers: impl IntoIterator<Item = P>) -> Parser<I>
where
    I: Input + ?Sized,
    P: Into<LazyParser<I>>,
{
    let mut sequenced = always(Value::List(Vec::new()));
    for parser in parsers {
        sequenced = chain(sequenced, parser, |collected, item| match collected {
            Value::List(mut items) => {
                items.push(item);
                Value::List(items)
            }
            other => Value::List(vec![other, item]),
        });
    }
    sequenced
}

/// Two-parser sequence producing `[first, second]`.
#[must_use]
pub fn seq2<I: Input + ?Sized>(
    first: impl Into<LazyParser<I>>,
    second: impl Into<LazyParser<I>>,
) -> Parser<I> {
    seq(vec![first.into(), second.into()])
}

/// Three-parser sequence.
#[must_use]
pub fn seq3<I: Input + ?Sized>(
    first: impl Into<LazyParser<I>>,
    second: impl Into<LazyParser<I>>,
    third: impl Into<LazyParser<I>>,
) -> Parser<I> {
    seq(vec![first.into(), second.into(), third.into()])
}

/// Four-parser sequence.
#[must_use]
pub fn seq4<I: Input + ?Sized>(
    first: impl Into<LazyParser<I>>,
    second: impl Into<LazyParser<I>>,
    third: impl Into<LazyParser<I>>,
    fourth: impl Into<LazyParser<I>>,
) -> Parser<I> {
    seq(vec![first.into(), second.into(), third.into(), fourth.into()])
}

/// Five-parser sequence.
#[must_use]
pub fn seq5<I: Input + ?Sized>(
    first: impl Into<LazyParser<I>>,
    second: impl Into<LazyParser<I>>,
    third: impl Into<LazyParser<I>>,
    fourth: impl Into<LazyParser<I>>,
    fifth: impl Into<LazyParser<I>>,
) -> Parser<I> {
    seq(vec![
        first.into(),
        second.into(),
        third.into(),
        fourth.into(),
        fifth.into(),
    ])
}

/// Try every alternative at the same position.
///
/// Earlier alternatives win for single-result callers; when the driver is
/// asked for all matches, every succeeding alternative is delivered. When all
/// alternatives fail, the most informative failure is reported (highest
/// priority, then latest position), with a generic `Expected …` naming the
/// alternation when no child got further than its start.
#[must_use]
pub fn alt<I, P>(parsers: impl IntoIterator<Item = P>) -> Parser<I>
where
    I: Input + ?Sized,
    P: Into<LazyParser<I>>,
{
    let children: Vec<LazyParser<I>> = parsers.into_iter().map(Into::into).collect();
    let scheduled = children.clone();
    Parser::build_cyclic(
        "alt",
        true,
        children,
        |descriptions| descriptions.join(" | "),
        move |weak| {
            Box::new(move |_input, index| {
                if scheduled.is_empty() {
                    let description = describe_weak(&weak, "alt");
                    return Ok(terminal(Match::expected(index, &description)));
                }
                let remaining = Rc::new(Cell::new(scheduled.len()));
                let failures: Rc<RefCell<Vec<Match>>> = Rc::new(RefCell::new(Vec::new()));
                let mut steps = Steps::new();
                for child in &scheduled {
                    let parser = child.resolve()?;
                    let remaining = Rc::clone(&remaining);
                    let failures = Rc::clone(&failures);
                    let weak = weak.clone();
                    let counted = Cell::new(false);
                    steps.extend(schedule(parser, index, move |outcome| match outcome {
                        success @ Match::Success { .. } => Ok(terminal(success.clone())),
                        failure @ Match::Failure { .. } => {
                            failures.borrow_mut().push(failure.clone());
                            if counted.replace(true) {
                                return Ok(Steps::new());
                            }
                            remaining.set(remaining.get() - 1);
                            if remaining.get() == 0 {
                                let description = describe_weak(&weak, "alt");
                                Ok(terminal(summarize_alternatives(
                                    &failures.borrow(),
                                    index,
                                    &description,
                                )))
                            } else {
                                Ok(Steps::new())
                            }
                        }
                    }));
                }
                Ok(steps)
            })
        },
    )
}

/// Pick the most informative failure; fall back to a generic message when
/// nothing got further than the alternation's own start.
fn summarize_alternatives(failures: &[Match], start: usize, description: &str) -> Match {
    let mut best: Option<Match> = None;
    for failure in failures {
        best = Some(match best.take() {
            Some(current) => pick_failure(current, failure.clone()),
            None => failure.clone(),
        });
    }
    match best {
        Some(failure) if failure.priority() > 0 || failure.span().start() > start => failure,
        _ => Match::expected(start, description),
    }
}

/// Make `parser` optional: both the consumed branch and a zero-width `Null`
/// branch stay live.
#[must_use]
pub fn optional<I: Input + ?Sized>(parser: impl Into<LazyParser<I>>) -> Parser<I> {
    optional_with("optional", parser.into(), Value::Null)
}

/// Like [`optional`], with an explicit value for the empty branch.
///
/// Not cacheable when `default` is a non-primitive value.
#[must_use]
pub fn optional_or<I: Input + ?Sized>(
    parser: impl Into<LazyParser<I>>,
    default: Value,
) -> Parser<I> {
    optional_with("optional_or", parser.into(), default)
}

fn optional_with<I: Input + ?Sized>(
    name: &'static str,
    child: LazyParser<I>,
    default: Value,
) -> Parser<I> {
    let cacheable = default.is_primitive();
    let scheduled = child.clone();
    Parser::build(
        name,
        cacheable,
        vec![child],
        |children| format!("[{}]", children[0]),
        move |_input, index| {
            let parser = scheduled.resolve()?;
            let mut steps = defer(parser, index);
            steps.push(Step::Terminal(Match::success(
                index,
                index,
                default.clone(),
            )));
            Ok(steps)
        },
    )
}

/// Zero-width lookahead: succeed (forwarding the value) without consuming.
#[must_use]
pub fn check<I: Input + ?Sized>(parser: impl Into<LazyParser<I>>) -> Parser<I> {
    let child = parser.into();
    let scheduled = child.clone();
    Parser::build(
        "check",
        true,
        vec![child],
        |children| format!("&{}", children[0]),
        move |_input, index| {
            let parser = scheduled.resolve()?;
            Ok(schedule_map(parser, index, move |_span, value| {
                Ok(terminal(Match::success(index, index, value.clone())))
            }))
        },
    )
}

/// Negative lookahead: succeed zero-width (with a `Null` value) exactly when
/// `parser` fails.
#[must_use]
pub fn not<I: Input + ?Sized>(parser: impl Into<LazyParser<I>>) -> Parser<I> {
    let child = parser.into();
    let scheduled = child.clone();
    Parser::build_cyclic(
        "not",
        true,
        vec![child],
        |children| format!("!{}", children[0]),
        move |weak| {
            Box::new(move |_input, index| {
                let parser = scheduled.resolve()?;
                let weak = weak.clone();
                Ok(schedule(parser, index, move |outcome| match outcome {
                    Match::Success { .. } => {
                        let description = describe_weak(&weak, "not");
                        Ok(terminal(Match::expected(index, &description)))
                    }
                    Match::Failure { .. } => {
                        Ok(terminal(Match::success(index, index, Value::Null)))
                    }
                }))
            })
        },
    )
}

/// Repeat `parser` between `min` and `max` times (`None` for unbounded),
/// producing a list value.
///
/// Every count at or above `min` stays a live branch; longer matches are
/// delivered first. A zero-width child success is a grammar defect, not a
/// parse failure.
#[must_use]
pub fn repeat<I: Input + ?Sized>(
    parser: impl Into<LazyParser<I>>,
    min: usize,
    max: Option<usize>,
) -> Parser<I> {
    let child = parser.into();
    let scheduled = child.clone();
    Parser::build_cyclic(
        "repeat",
        true,
        vec![child],
        move |children| match (min, max) {
            (0, None) => format!("{}*", children[0]),
            (1, None) => format!("{}+", children[0]),
            (m, None) => format!("{}{{{m},}}", children[0]),
            (m, Some(n)) => format!("{}{{{m},{n}}}", children[0]),
        },
        move |weak| {
            Box::new(move |_input, index| {
                repeat_step(&scheduled, &weak, min, max, index, 0, Vec::new(), index)
            })
        },
    )
}

/// Zero or more repetitions.
#[must_use]
pub fn star<I: Input + ?Sized>(parser: impl Into<LazyParser<I>>) -> Parser<I> {
    repeat(parser, 0, None)
}

/// One or more repetitions.
#[must_use]
pub fn plus<I: Input + ?Sized>(parser: impl Into<LazyParser<I>>) -> Parser<I> {
    repeat(parser, 1, None)
}

#[allow(clippy::too_many_arguments)]
fn repeat_step<I: Input + ?Sized>(
    child: &LazyParser<I>,
    weak: &Weak<ParserCore<I>>,
    min: usize,
    max: Option<usize>,
    origin: usize,
    count: usize,
    collected: Vec<Value>,
    position: usize,
) -> Result<Steps<I>, GrammarError> {
    let mut steps = Steps::new();
    if max.map_or(true, |limit| count < limit) {
        let parser = child.resolve()?;
        let child = child.clone();
        let weak = weak.clone();
        let snapshot = collected.clone();
        steps.extend(schedule(parser, position, move |outcome| match outcome {
            Match::Success { span, value } => {
                if span.is_empty() {
                    return Err(GrammarError::RepeatNotProgressing {
                        position: span.start(),
                    });
                }
                let mut extended = snapshot.clone();
                extended.push(value.clone());
                repeat_step(
                    &child,
                    &weak,
                    min,
                    max,
                    origin,
                    count + 1,
                    extended,
                    span.end(),
                )
            }
            Match::Failure { span, .. } => {
                if count < min {
                    let description = describe_weak(&weak, "repeat");
                    Ok(terminal(Match::Failure {
                        span: Span::new(origin, span.start().max(origin)),
                        message: format!("Expected {description}"),
                        priority: 0,
                    }))
                } else {
                    Ok(Steps::new())
                }
            }
        }));
    }
    if count >= min {
        steps.push(Step::Terminal(Match::success(
            origin,
            position,
            Value::List(collected),
        )));
    }
    Ok(steps)
}

/// Tie a recursive knot: `build` receives a handle to the parser being
/// defined and returns its body.
///
/// The handle is cacheable, which is what lets left-recursive grammars reach a
/// fixed point instead of descending forever.
#[must_use]
pub fn recursive<I: Input + ?Sized>(build: impl FnOnce(Parser<I>) -> Parser<I>) -> Parser<I> {
    let target: Rc<OnceCell<Parser<I>>> = Rc::new(OnceCell::new());
    let described = Rc::clone(&target);
    let dispatched = Rc::clone(&target);
    let handle = Parser::build(
        "recurse",
        true,
        Vec::new(),
        move |_| {
            described
                .get()
                .map_or_else(|| String::from("recurse"), Parser::description)
        },
        move |_input, index| {
            let body = dispatched.get().ok_or(GrammarError::UnboundReference)?;
            Ok(defer(body.clone(), index))
        },
    );
    let body = build(handle.clone());
    let _ = target.set(body);
    handle
}

impl<I: Input + ?Sized> Parser<I> {
    /// Transform the produced value; the span is preserved.
    #[must_use]
    pub fn map(&self, f: impl Fn(Value, Span) -> Value + 'static) -> Parser<I> {
        let inner = self.clone();
        let f = Rc::new(f);
        Parser::build(
            "map",
            true,
            vec![LazyParser::eager(self.clone())],
            |children| children.first().cloned().unwrap_or_default(),
            move |_input, index| {
                let f = Rc::clone(&f);
                Ok(schedule_map(inner.clone(), index, move |span, value| {
                    Ok(terminal(Match::Success {
                        span,
                        value: f(value.clone(), span),
                    }))
                }))
            },
        )
    }

    /// Rename this parser for error reporting, tagging its failures with a
    /// priority for best-failure selection.
    #[must_use]
    pub fn named(&self, name: impl Into<String>, priority: u8) -> Parser<I> {
        let label = name.into();
        let message = format!("Expected {label}");
        let inner = self.clone();
        Parser::build(
            "named",
            true,
            vec![LazyParser::eager(self.clone())],
            move |_| label.clone(),
            move |_input, index| {
                let message = message.clone();
                Ok(schedule(inner.clone(), index, move |outcome| {
                    match outcome {
                        success @ Match::Success { .. } => Ok(terminal(success.clone())),
                        Match::Failure { span, .. } => Ok(terminal(Match::Failure {
                            span: *span,
                            message: message.clone(),
                            priority,
                        })),
                    }
                }))
            },
        )
    }
}
