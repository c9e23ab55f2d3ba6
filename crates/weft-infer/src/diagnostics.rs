//! Rendering of propagation errors for terminal output.
//!
//! A parse failure points back into the offending pin's spec text with a
//! labeled report. An incompatibility has no single source text to label,
//! so it renders as a header plus its cause chain. An invalid run option
//! renders as a bare header.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use weft_typeexpr::SyntaxError;

use crate::board::Board;
use crate::error::PropagateError;

/// Render a propagation error into a formatted diagnostic string.
pub fn render_diagnostic(error: &PropagateError, board: &Board) -> String {
    match error {
        PropagateError::Parse { node, pin, source } => render_parse(board, node, pin, source),
        PropagateError::Incompatible { channel, source } => {
            render_incompatible(channel, source)
        }
        PropagateError::InvalidDefault { .. } => format!("[E1003] Error: {error}\n"),
    }
}

fn render_parse(board: &Board, node: &str, pin: &str, error: &SyntaxError) -> String {
    let spec = board
        .node(node)
        .and_then(|n| n.pin(pin))
        .map(|p| p.spec.as_str())
        .unwrap_or("");
    let config = Config::default().with_color(false);
    let spec_len = spec.len();

    // Clamp a range to be valid within spec bounds.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(spec_len);
        let e = r.end.min(spec_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(spec_len)
        } else {
            s..e
        }
    };

    let range = clamp(error.span.range());

    let mut builder = Report::build(ReportKind::Error, range.clone())
        .with_code("E1001")
        .with_message(format!("invalid type spec on pin `{node}.{pin}`: {error}"))
        .with_config(config);
    builder.add_label(
        Label::new(range)
            .with_message(error.to_string())
            .with_color(Color::Red),
    );
    let report = builder.finish();

    let mut buf = Vec::new();
    let cache = Source::from(spec);
    report.write(cache, &mut buf).expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

fn render_incompatible(channel: &str, source: &weft_typeexpr::UnifyError) -> String {
    let mut out = format!("[E1002] Error: incompatible types on channel `{channel}`\n");
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(source);
    while let Some(err) = cause {
        out.push_str(&format!("   = note: {err}\n"));
        cause = err.source();
    }
    out
}
