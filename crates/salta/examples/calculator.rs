//! Left-recursive arithmetic evaluator.
//!
//! Run with: `cargo run --example calculator`

use salta::error::render::annotate;
use salta::matchers::pattern;
use salta::{alt, chain, recursive, LazyParser, Parser, Value};

fn number() -> Parser<str> {
    pattern("[0-9]+")
        .expect("numeric pattern is valid")
        .map(|value, _| Value::Int(value.as_str().unwrap_or("0").parse().unwrap_or(0)))
}

/// `Sum = Sum '+' Product | Product` and `Product = Product '*' Number | Number`.
///
/// Both rules are left recursive, so evaluation is left associative and `*`
/// binds tighter than `+`.
fn arithmetic() -> Parser<str> {
    let product = recursive(|product| {
        alt(vec![
            LazyParser::eager(chain(
                chain(product, pattern("\\*").expect("operator pattern is valid"), |lhs, _| lhs),
                number(),
                |lhs, rhs| Value::Int(lhs.as_int().unwrap_or(0) * rhs.as_int().unwrap_or(0)),
            )),
            number().into(),
        ])
    });
    recursive(|sum| {
        alt(vec![
            LazyParser::eager(chain(
                chain(sum, pattern("\\+").expect("operator pattern is valid"), |lhs, _| lhs),
                product.clone(),
                |lhs, rhs| Value::Int(lhs.as_int().unwrap_or(0) + rhs.as_int().unwrap_or(0)),
            )),
            product.clone().into(),
        ])
    })
}

fn main() {
    let parser = arithmetic().consume();
    for input in ["1+2+3", "2*3+4", "10+2*5", "1+*2"] {
        match parser.run(input) {
            Ok(value) => println!("{input} = {value}"),
            Err(error) => {
                println!("{input} does not parse:");
                if let Some(span) = error.span() {
                    println!("{}", annotate(input, span, &error.to_string()));
                } else {
                    println!("{error}");
                }
            }
        }
    }
}
