//! Tests for the leaf matchers

use salta::matchers::{any_char, end, literal, pattern, satisfy};
use salta::{Match, Parser, Span, Value};

#[test]
fn test_literal_matches_prefix() {
    let m = literal("abc").execute("abcdef").unwrap();
    assert_eq!(m, Match::success(0, 3, Value::from("abc")));
}

#[test]
fn test_literal_failure_carries_description() {
    let m = literal("abc").execute("abd").unwrap();
    assert!(m.is_failure());
    assert_eq!(m.span(), Span::empty(0));
    assert_eq!(m.message(), Some("Expected \"abc\""));
}

#[test]
fn test_literal_fails_past_end() {
    let m = literal("abc").execute("ab").unwrap();
    assert!(m.is_failure());
}

#[test]
fn test_pattern_is_anchored() {
    let parser = pattern("b+").unwrap();
    let m = parser.execute("abbb").unwrap();
    assert!(m.is_failure(), "pattern must not search past the position");
    assert_eq!(m.span(), Span::empty(0));
}

#[test]
fn test_pattern_matches_greedily_at_position() {
    let parser = pattern("[0-9]+").unwrap();
    let m = parser.execute("123abc").unwrap();
    assert_eq!(m, Match::success(0, 3, Value::from("123")));
}

#[test]
fn test_pattern_rejects_invalid_source() {
    assert!(pattern("[unclosed").is_err());
}

#[test]
fn test_end_only_matches_at_len() {
    let parser = end::<str>();
    assert_eq!(parser.execute("").unwrap(), Match::success(0, 0, Value::Null));
    assert!(parser.execute("x").unwrap().is_failure());
}

#[test]
fn test_any_char_handles_multibyte() {
    let m = any_char().execute("était").unwrap();
    assert_eq!(m, Match::success(0, 2, Value::from("é")));
}

#[test]
fn test_any_char_fails_on_empty() {
    assert!(any_char().execute("").unwrap().is_failure());
}

#[test]
fn test_satisfy_uses_predicate_and_description() {
    let digit = satisfy("digit", |ch| ch.is_ascii_digit());
    assert_eq!(digit.execute("7x").unwrap(), Match::success(0, 1, Value::from("7")));
    let m = digit.execute("x7").unwrap();
    assert_eq!(m.message(), Some("Expected digit"));
}

#[test]
fn test_custom_leaf_obeys_the_contract() {
    let even_position = Parser::leaf("even", "an even position", |_: &str, index| {
        if index % 2 == 0 {
            Match::success(index, index, Value::from(true))
        } else {
            Match::failure(index, "Expected an even position")
        }
    });
    assert!(even_position.execute("xyz").unwrap().is_success());
    assert!(even_position.is_cacheable());
    assert_eq!(even_position.description(), "an even position");
}
