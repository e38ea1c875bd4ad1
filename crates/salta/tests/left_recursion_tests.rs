//! Tests for left-recursive and cyclic grammars

use salta::matchers::{literal, pattern};
use salta::{alt, chain, lazy, recursive, LazyParser, Parser, Value};

fn number() -> Parser<str> {
    pattern("[0-9]+").unwrap()
}

/// `Sum = Sum '+' Number | Number`, folding left into a parenthesized string.
fn sum_grammar() -> Parser<str> {
    recursive(|sum| {
        alt(vec![
            LazyParser::eager(chain(
                chain(sum, literal("+"), |lhs, _| lhs),
                number(),
                |lhs, rhs| Value::from(format!("({lhs}+{rhs})")),
            )),
            number().into(),
        ])
    })
}

#[test]
fn test_left_recursion_folds_left() {
    assert_eq!(
        sum_grammar().consume().run("1+2+3").unwrap(),
        Value::from("((1+2)+3)")
    );
}

#[test]
fn test_left_recursion_base_case() {
    assert_eq!(sum_grammar().consume().run("7").unwrap(), Value::from("7"));
}

#[test]
fn test_left_recursion_rejects_dangling_operator() {
    assert!(sum_grammar().consume().run("1+2+").is_err());
}

#[test]
fn test_left_recursion_enumerates_prefixes() {
    let matches = sum_grammar().execute_all("1+2+3").unwrap();
    let ends: Vec<usize> = matches.iter().map(|m| m.span().end()).collect();
    assert_eq!(ends, vec![1, 3, 5]);
    assert_eq!(matches[2].value(), Some(&Value::from("((1+2)+3)")));
}

#[test]
fn test_left_recursion_deep_input_no_overflow() {
    let input = vec!["1"; 200].join("+");
    let value = sum_grammar().consume().run(input.as_str()).unwrap();
    assert!(value.as_str().unwrap().starts_with("(("));
    assert!(value.as_str().unwrap().ends_with("+1)"));
}

#[test]
fn test_indirect_left_recursion() {
    // A = B 'x' | 'y' ; B = A
    let a = recursive(|a| {
        let b = alt(vec![a]);
        alt(vec![
            LazyParser::eager(chain(b, literal("x"), |lhs, rhs| {
                Value::from(format!("{lhs}{rhs}"))
            })),
            literal("y").into(),
        ])
    });
    assert_eq!(a.consume().run("yxx").unwrap(), Value::from("yxx"));
}

#[test]
fn test_lazy_thunk_wires_a_forward_reference() {
    let digits = number();
    let parser = chain(lazy(move || digits), literal("!"), |value, _| value);
    assert_eq!(parser.consume().run("5!").unwrap(), Value::from("5"));
}

#[test]
fn test_nested_recursive_grammars() {
    // Product = Product '*' Number | Number, then Sum over Products.
    let int_number =
        || number().map(|value, _| Value::Int(value.as_str().unwrap_or("0").parse().unwrap_or(0)));
    let product = recursive(|product| {
        alt(vec![
            LazyParser::eager(chain(
                chain(product, literal("*"), |lhs, _| lhs),
                int_number(),
                |lhs, rhs| Value::Int(lhs.as_int().unwrap_or(0) * rhs.as_int().unwrap_or(0)),
            )),
            int_number().into(),
        ])
    });
    let sum = recursive(|sum| {
        alt(vec![
            LazyParser::eager(chain(
                chain(sum, literal("+"), |lhs, _| lhs),
                product.clone(),
                |lhs, rhs| Value::Int(lhs.as_int().unwrap_or(0) + rhs.as_int().unwrap_or(0)),
            )),
            product.clone().into(),
        ])
    });
    assert_eq!(sum.consume().run("2*3+4").unwrap(), Value::Int(10));
    assert_eq!(sum.consume().run("1+2*5").unwrap(), Value::Int(11));
}
