//! Tests for the trampoline: memoization, ordering, budgets, and defects

use salta::matchers::literal;
use salta::{alt, chain, optional, seq2, star, GrammarError, ParseConfig, Value};

#[test]
fn test_shared_subparser_is_memoized() {
    let shared = literal("ab");
    let parser = alt(vec![
        seq2(shared.clone(), literal("cd")),
        seq2(shared.clone(), literal("ef")),
    ]);
    let report = parser.execute_with("abef", &ParseConfig::default()).unwrap();
    assert!(report.is_success());
    assert!(
        report.metrics.cache_hits >= 1,
        "the shared literal should be answered from the cache on its second activation"
    );
}

#[test]
fn test_distinct_parsers_are_distinct_cache_keys() {
    // Two structurally identical literals still get separate memo entries.
    let parser = alt(vec![literal("a"), literal("a")]);
    let report = parser.execute_with("a", &ParseConfig::default()).unwrap();
    assert_eq!(report.matches.len(), 2);
    assert!(report.metrics.cache_entries >= 2);
}

#[test]
fn test_metrics_record_work() {
    let parser = chain(literal("a"), literal("b"), |a, _| a);
    let report = parser.execute_with("ab", &ParseConfig::default()).unwrap();
    assert!(report.is_success());
    assert!(report.metrics.steps > 0);
    assert!(report.metrics.cache_entries >= 2);
    assert!(report.metrics.max_depth >= 1);
}

#[test]
fn test_step_limit_aborts_the_parse() {
    let parser = star(literal("a"));
    let config = ParseConfig {
        max_steps: Some(5),
        ..ParseConfig::default()
    };
    let input = "a".repeat(100);
    let err = parser.execute_with(input.as_str(), &config).unwrap_err();
    assert_eq!(err, GrammarError::StepLimitExceeded { limit: 5 });
}

#[test]
fn test_no_progress_defect_is_not_a_parse_failure() {
    let parser = star(optional(literal("a")));
    let err = parser.execute("zz").unwrap_err();
    assert_eq!(err, GrammarError::RepeatNotProgressing { position: 0 });
}

#[test]
fn test_report_keeps_best_failure_alongside_successes() {
    let parser = optional(literal("x"));
    let report = parser.execute_with("y", &ParseConfig::default()).unwrap();
    assert!(report.is_success());
    let failure = report.failure.expect("the consumed branch failed");
    assert_eq!(failure.message(), Some("Expected \"x\""));
}

#[test]
fn test_execute_window_discards_out_of_range_successes() {
    let parser = literal("abc");
    let config = ParseConfig {
        end: Some(2),
        ..ParseConfig::default()
    };
    let report = parser.execute_with("abc", &config).unwrap();
    assert!(report.matches.is_empty());
    let failure = report.failure.expect("a fallback failure is synthesized");
    assert_eq!(failure.span().start(), 0);
}

#[test]
fn test_best_failure_prefers_latest_position() {
    let parser = alt(vec![
        chain(literal("aa"), literal("bb"), |a, _| a),
        chain(literal("a"), literal("zz"), |a, _| a),
    ]);
    let m = parser.execute("aacc").unwrap();
    assert!(m.is_failure());
    // "bb" failed at 2, "zz" failed at 1; the deeper one wins.
    assert_eq!(m.span().start(), 2);
    assert_eq!(m.message(), Some("Expected \"bb\""));
}

#[test]
fn test_best_failure_prefers_priority_over_position() {
    let parser = alt(vec![
        chain(literal("aa"), literal("bb"), |a, _| a),
        literal("q").named("the letter q", 3),
    ]);
    let m = parser.execute("aacc").unwrap();
    assert_eq!(m.message(), Some("Expected the letter q"));
}

#[test]
fn test_delivery_order_is_depth_first() {
    // The consuming optional branch is explored before the empty branch.
    let parser = seq2(optional(literal("a")), star(literal("a")));
    let matches = parser.execute_all("aa").unwrap();
    let first = &matches[0];
    assert_eq!(first.span().end(), 2);
    let items = first.value().unwrap().as_list().unwrap();
    // Greedy first result: optional consumed one "a", star consumed the rest.
    assert_eq!(items[0], Value::from("a"));
}

#[test]
fn test_all_parses_of_an_ambiguous_split_are_found() {
    // "aa" splits between the optional and the star in two ways.
    let parser = seq2(optional(literal("a")), star(literal("a"))).consume();
    let matches = parser.execute_all("aa").unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.span().end() == 2));
}
