//! Plain-text rendering of failure locations.

use crate::span::Span;
use std::fmt::Write;

/// One-based line and column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Compute the 1-based line and column of a byte offset.
#[must_use]
pub fn line_col(source: &str, offset: usize) -> LineCol {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut column = 1;
    for (at, ch) in source.char_indices() {
        if at >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    LineCol { line, column }
}

/// Render the line containing `span` with a caret marker underneath.
#[must_use]
pub fn annotate(source: &str, span: Span, message: &str) -> String {
    let start = span.start().min(source.len());
    let line_start = source[..start].rfind('\n').map_or(0, |at| at + 1);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |at| line_start + at);
    let line = &source[line_start..line_end];
    let location = line_col(source, start);

    let pad = source[line_start..start].chars().count();
    let width = if span.is_empty() {
        1
    } else {
        source[start..span.end().min(line_end)].chars().count().max(1)
    };

    let mut rendered = String::new();
    writeln!(
        rendered,
        "{message} at line {}, column {}",
        location.line, location.column
    )
    .unwrap();
    writeln!(rendered, "  | {line}").unwrap();
    write!(rendered, "  | {}{}", " ".repeat(pad), "^".repeat(width)).unwrap();
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_single_line() {
        let at = line_col("hello", 3);
        assert_eq!(at, LineCol { line: 1, column: 4 });
    }

    #[test]
    fn test_line_col_multi_line() {
        let source = "one\ntwo\nthree";
        let at = line_col(source, 5);
        assert_eq!(at, LineCol { line: 2, column: 2 });
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let at = line_col("ab", 99);
        assert_eq!(at, LineCol { line: 1, column: 3 });
    }

    #[test]
    fn test_annotate_points_at_offset() {
        let rendered = annotate("ab\ncdef", Span::empty(5), "Expected \"x\"");
        assert!(rendered.contains("line 2, column 3"));
        assert!(rendered.contains("  | cdef"));
        assert!(rendered.ends_with("  |   ^"));
    }

    #[test]
    fn test_annotate_widens_over_span() {
        let rendered = annotate("abcdef", Span::new(1, 4), "bad");
        assert!(rendered.ends_with("  |  ^^^"));
    }
}
