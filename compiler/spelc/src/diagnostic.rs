//! Plain-text error reports pointing into the expression source.
//!
//! ```text
//! error: property 'b' cannot be found on object of type 'object'
//!   |
//!   | a.b.c
//!   |   ^
//! ```

use std::fmt::Write;

use spel_ir::Span;

/// Render `message` and, when `span` is known, the source line it falls on
/// with the span underlined.
pub fn render(source: &str, message: &str, span: Option<Span>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "error: {message}");
    let Some(span) = span else {
        return output;
    };

    let start = (span.start as usize).min(source.len());
    let end = (span.end as usize).clamp(start, source.len());
    if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
        return output;
    }
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[start..].find('\n').map_or(source.len(), |i| start + i);
    let line = &source[line_start..line_end];

    // Columns are counted in characters so multi-byte text lines up
    let column = source[line_start..start].chars().count();
    let end = end.min(line_end);
    let width = source[start..end].chars().count().max(1);

    let _ = writeln!(output, "  |");
    let _ = writeln!(output, "  | {line}");
    let _ = writeln!(output, "  | {}{}", " ".repeat(column), "^".repeat(width));
    output
}
