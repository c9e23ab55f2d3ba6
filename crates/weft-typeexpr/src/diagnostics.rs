//! Ariadne-based rendering of spec parse errors.
//!
//! Renders a [`SyntaxError`] against the spec text it came from. Output is
//! colorless for consistent snapshots, with an error code, a labeled span,
//! and a fix suggestion when a plausible fix exists.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::{SyntaxError, SyntaxErrorKind};

/// Assign a unique error code to each syntax error kind.
fn error_code(error: &SyntaxError) -> &'static str {
    match error.kind {
        SyntaxErrorKind::Unexpected { .. } => "E0001",
        SyntaxErrorKind::TrailingInput(_) => "E0002",
        SyntaxErrorKind::ArrayLenOverflow(_) => "E0003",
        SyntaxErrorKind::Unsupported(_) => "E0004",
    }
}

/// Short label text for the offending span.
fn label_message(error: &SyntaxError) -> String {
    match &error.kind {
        SyntaxErrorKind::Unexpected { expected, .. } => format!("expected {expected} here"),
        SyntaxErrorKind::TrailingInput(_) => "this does not belong to the type".to_string(),
        SyntaxErrorKind::ArrayLenOverflow(_) => "too large".to_string(),
        SyntaxErrorKind::Unsupported(what) => format!("{what} is not allowed in a spec"),
    }
}

/// Generate a fix suggestion where one is obvious.
fn fix_suggestion(error: &SyntaxError) -> Option<&'static str> {
    match &error.kind {
        SyntaxErrorKind::TrailingInput(_) => Some("a spec holds exactly one type"),
        SyntaxErrorKind::ArrayLenOverflow(_) => {
            Some("array lengths must fit in an unsigned 64-bit integer")
        }
        SyntaxErrorKind::Unsupported(what) => match *what {
            "non-empty interface body" => {
                Some("only the empty interface `interface{}` can appear in a spec")
            }
            "variadic parameter" => Some("spell each parameter type out; `...` is not supported"),
            "named function parameter" => Some("write only the types, without parameter names"),
            "embedded struct field" => Some("give every field an explicit name"),
            "struct field tag" => Some("remove the tag; tags carry no type information"),
            _ => None,
        },
        SyntaxErrorKind::Unexpected { .. } => None,
    }
}

/// Render a syntax error into a formatted diagnostic string using ariadne.
pub fn render_diagnostic(error: &SyntaxError, source: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp a range to be valid within source bounds.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        // Ensure non-empty span for ariadne (it needs at least 1-char span).
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let range = clamp(error.span.range());

    let mut builder = Report::build(ReportKind::Error, range.clone())
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config);
    builder.add_label(
        Label::new(range)
            .with_message(label_message(error))
            .with_color(Color::Red),
    );
    if let Some(fix) = fix_suggestion(error) {
        builder.set_help(fix);
    }
    let report = builder.finish();

    let mut buf = Vec::new();
    let cache = Source::from(source);
    report.write(cache, &mut buf).expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::TypeExpr;

    fn render(spec: &str) -> String {
        let err = TypeExpr::parse("n", spec).expect_err("spec should be rejected");
        render_diagnostic(&err, spec)
    }

    #[test]
    fn renders_code_message_and_span() {
        let out = render("map[string] @");
        assert!(out.contains("E0001"), "missing code in:\n{out}");
        assert!(out.contains("expected a type, found `@`"), "missing message in:\n{out}");
        assert!(out.contains("map[string] @"), "missing source line in:\n{out}");
    }

    #[test]
    fn renders_help_for_unsupported_forms() {
        let out = render("func(...int)");
        assert!(out.contains("E0004"), "missing code in:\n{out}");
        assert!(out.contains("Help"), "missing help section in:\n{out}");
        assert!(out.contains("`...` is not supported"), "missing suggestion in:\n{out}");
    }

    #[test]
    fn clamps_end_of_input_spans() {
        // The error span sits at the very end of the spec; rendering must
        // not panic and still names the problem.
        let out = render("map[int");
        assert!(out.contains("expected `]` after map key"), "missing message in:\n{out}");
    }
}
