//! Property-based invariants over the engine

use proptest::prelude::*;
use salta::matchers::literal;
use salta::{check, not, repeat, star, Match};

proptest! {
    #[test]
    fn prop_success_spans_stay_in_bounds(
        input in "[a-c]{0,12}",
        needle in "[a-c]{1,3}",
    ) {
        let parser = star(literal(needle));
        for m in parser.execute_all(input.as_str()).unwrap() {
            if let Match::Success { span, .. } = m {
                prop_assert!(span.start() <= span.end());
                prop_assert!(span.end() <= input.len());
            }
        }
    }

    #[test]
    fn prop_check_is_zero_width_and_equisuccessful(
        input in "[ab]{0,8}",
        needle in "[ab]{1,2}",
    ) {
        let direct = literal(needle.clone());
        let guarded = check(literal(needle));
        let direct_outcome = direct.execute(input.as_str()).unwrap();
        let guarded_outcome = guarded.execute(input.as_str()).unwrap();
        prop_assert_eq!(direct_outcome.is_success(), guarded_outcome.is_success());
        if let Match::Success { span, .. } = guarded_outcome {
            prop_assert_eq!(span.start(), span.end());
        }
    }

    #[test]
    fn prop_not_is_exclusive_with_its_parser(
        input in "[ab]{0,8}",
        needle in "[ab]{1,2}",
    ) {
        let hit = literal(needle.clone()).execute(input.as_str()).unwrap().is_success();
        let miss = not(literal(needle)).execute(input.as_str()).unwrap().is_success();
        prop_assert!(hit ^ miss);
    }

    #[test]
    fn prop_repeat_enumerates_counts(reps in 0_usize..6, min in 0_usize..3) {
        let input = "a".repeat(reps);
        let parser = repeat(literal("a"), min, None);
        let matches = parser.execute_all(input.as_str()).unwrap();
        if reps < min {
            prop_assert_eq!(matches.len(), 1);
            prop_assert!(matches[0].is_failure());
        } else {
            let mut ends: Vec<usize> = matches.iter().map(|m| m.span().end()).collect();
            ends.sort_unstable();
            let expected: Vec<usize> = (min..=reps).collect();
            prop_assert_eq!(ends, expected);
        }
    }
}
