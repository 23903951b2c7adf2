//! Flattening rendered lines into terminal text.

use std::fmt::Write;

use crossterm::style::{Color, ContentStyle, Stylize};

use super::types::{InlineColor, InlineSpan, InlineStyle, RenderedLine};

pub fn to_crossterm_color(color: InlineColor) -> Color {
    match color {
        InlineColor::Indexed(idx) => Color::AnsiValue(idx),
        InlineColor::Rgb(r, g, b) => Color::Rgb { r, g, b },
    }
}

fn content_style(style: InlineStyle) -> ContentStyle {
    let mut out = ContentStyle::new();
    if let Some(fg) = style.fg {
        out = out.with(to_crossterm_color(fg));
    }
    if let Some(bg) = style.bg {
        out = out.on(to_crossterm_color(bg));
    }
    if style.bold {
        out = out.bold();
    }
    if style.italic {
        out = out.italic();
    }
    if style.dim {
        out = out.dim();
    }
    if style.underline {
        out = out.underlined();
    }
    out
}

fn write_spans(out: &mut String, spans: &[InlineSpan]) {
    for span in spans {
        if span.style() == InlineStyle::default() {
            out.push_str(span.text());
        } else {
            let _ = write!(out, "{}", content_style(span.style()).apply(span.text()));
        }
    }
}

/// Append one line with SGR styling and an optional OSC 8 hyperlink.
///
/// Leading whitespace stays outside the hyperlink.
pub fn write_line(out: &mut String, line: &RenderedLine, hyperlinks: bool) {
    if let Some(escape) = line.passthrough_escape() {
        out.push_str(escape);
        out.push('\n');
        return;
    }

    let spans = line.spans();
    match line.hyperlink().filter(|_| hyperlinks) {
        Some(url) => {
            let lead = spans
                .iter()
                .take_while(|span| span.text().chars().all(char::is_whitespace))
                .count();
            write_spans(out, &spans[..lead]);
            let _ = write!(out, "\x1b]8;;{url}\x1b\\");
            write_spans(out, &spans[lead..]);
            out.push_str("\x1b]8;;\x1b\\");
        }
        None => write_spans(out, spans),
    }
    out.push('\n');
}
