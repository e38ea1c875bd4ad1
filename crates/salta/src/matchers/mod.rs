//! # Leaf matchers
//!
//! Concrete matchers for string input. Each one is built through
//! [`Parser::leaf`], the contract every external matcher obeys: a pure
//! function of `(input, index)` returning exactly one success or failure.
//! Leaves never suspend.

use compact_str::CompactString;
use regex::Regex;

use crate::input::Input;
use crate::parser::{Match, Parser};
use crate::value::Value;

/// Match an exact string at the current position.
#[must_use]
pub fn literal(text: impl Into<String>) -> Parser<str> {
    let text = text.into();
    let description = format!("{text:?}");
    let message = format!("Expected {description}");
    Parser::leaf("literal", description, move |input: &str, index| {
        match input.get(index..) {
            Some(rest) if rest.starts_with(text.as_str()) => {
                Match::success(index, index + text.len(), Value::from(text.as_str()))
            }
            _ => Match::failure(index, message.clone()),
        }
    })
}

/// Match a regular expression anchored at the current position.
///
/// The pattern is compiled as `^(?:…)`, so it matches exactly at the position
/// rather than searching ahead.
///
/// # Errors
///
/// Returns the compilation error for an invalid pattern.
pub fn pattern(source: &str) -> Result<Parser<str>, regex::Error> {
    let anchored = Regex::new(&format!("^(?:{source})"))?;
    let description = format!("/{source}/");
    let message = format!("Expected {description}");
    Ok(Parser::leaf("pattern", description, move |input: &str, index| {
        let Some(rest) = input.get(index..) else {
            return Match::failure(index, message.clone());
        };
        match anchored.find(rest) {
            Some(found) => {
                Match::success(index, index + found.end(), Value::from(found.as_str()))
            }
            None => Match::failure(index, message.clone()),
        }
    }))
}

/// Succeed only at the end of the input.
#[must_use]
pub fn end<I: Input + ?Sized>() -> Parser<I> {
    Parser::leaf("end", "end of input", |input: &I, index| {
        if index >= input.len() {
            Match::success(index, index, Value::Null)
        } else {
            Match::failure(index, "Expected end of input")
        }
    })
}

/// Match any single character.
#[must_use]
pub fn any_char() -> Parser<str> {
    Parser::leaf("any", "any character", |input: &str, index| {
        match input.get(index..).and_then(|rest| rest.chars().next()) {
            Some(ch) => {
                let mut text = CompactString::default();
                text.push(ch);
                Match::success(index, index + ch.len_utf8(), Value::Str(text))
            }
            None => Match::failure(index, "Expected any character"),
        }
    })
}

/// Match one character satisfying `predicate`.
#[must_use]
pub fn satisfy(
    description: impl Into<String>,
    predicate: impl Fn(char) -> bool + 'static,
) -> Parser<str> {
    let description = description.into();
    let message = format!("Expected {description}");
    Parser::leaf("satisfy", description, move |input: &str, index| {
        match input.get(index..).and_then(|rest| rest.chars().next()) {
            Some(ch) if predicate(ch) => {
                let mut text = CompactString::default();
                text.push(ch);
                Match::success(index, index + ch.len_utf8(), Value::Str(text))
            }
            _ => Match::failure(index, message.clone()),
        }
    })
}
