//! Word wrapping and width helpers for styled spans.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{InlineSpan, InlineStyle};

/// Display width of a string in terminal columns.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

pub fn spans_width(spans: &[InlineSpan]) -> usize {
    spans.iter().map(|span| display_width(span.text())).sum()
}

/// Word-wrap spans so every line, prefix included, fits in `width` columns.
///
/// The first line starts with `prefix_first`, continuation lines with
/// `prefix_next`. Words wider than a whole line are split.
pub fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &[InlineSpan],
    prefix_next: &[InlineSpan],
) -> Vec<Vec<InlineSpan>> {
    let room = width
        .saturating_sub(spans_width(prefix_first).max(spans_width(prefix_next)))
        .max(1);
    // Adjacent non-whitespace runs from different spans form one word,
    // so `[1]` and a following `.` never break apart.
    let mut words: Vec<Vec<InlineSpan>> = Vec::new();
    for span in spans {
        for token in split_inline_tokens(span) {
            match words.last_mut() {
                Some(word) if !is_whitespace(&token) && !word.iter().all(is_whitespace) => {
                    word.push(token);
                }
                _ => words.push(vec![token]),
            }
        }
    }

    let mut tokens: Vec<Vec<InlineSpan>> = Vec::with_capacity(words.len());
    for word in words {
        if spans_width(&word) > room && !word.iter().all(is_whitespace) {
            tokens.extend(split_to_width(&word, room));
        } else {
            tokens.push(word);
        }
    }

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = prefix_first.to_vec();
    let mut current_len = spans_width(prefix_first);
    let mut has_word = false;

    for token in tokens {
        let token_len = spans_width(&token);
        let token_is_ws = token.iter().all(is_whitespace);

        if current_len + token_len > width && has_word {
            trim_trailing_whitespace(&mut current);
            lines.push(std::mem::replace(&mut current, prefix_next.to_vec()));
            current_len = spans_width(prefix_next);
            has_word = false;
        }

        if token_is_ws && !has_word {
            // Drop leading whitespace at wrapped line starts.
            continue;
        }

        current_len += token_len;
        current.extend(token);
        if !token_is_ws {
            has_word = true;
        }
    }

    trim_trailing_whitespace(&mut current);
    lines.push(current);
    lines
}

fn is_whitespace(span: &InlineSpan) -> bool {
    span.text().chars().all(char::is_whitespace)
}

fn trim_trailing_whitespace(line: &mut Vec<InlineSpan>) {
    while line.len() > 1 && line.last().is_some_and(is_whitespace) {
        line.pop();
    }
}

/// Split a span into alternating runs of whitespace and non-whitespace.
fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        match ws_state {
            Some(state) if state == is_ws => buf.push(ch),
            Some(_) => {
                out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
                buf.push(ch);
                ws_state = Some(is_ws);
            }
            None => {
                buf.push(ch);
                ws_state = Some(is_ws);
            }
        }
    }

    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }

    out
}

/// Hard-split an over-long word into pieces of at most `width` columns.
fn split_to_width(word: &[InlineSpan], width: usize) -> Vec<Vec<InlineSpan>> {
    let mut out = Vec::new();
    let mut piece: Vec<InlineSpan> = Vec::new();
    let mut piece_width = 0usize;
    for span in word {
        let mut buf = String::new();
        for ch in span.text().chars() {
            let ch_width = ch.width().unwrap_or(0);
            if piece_width + ch_width > width && piece_width > 0 {
                if !buf.is_empty() {
                    piece.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
                }
                out.push(std::mem::take(&mut piece));
                piece_width = 0;
            }
            buf.push(ch);
            piece_width += ch_width;
        }
        if !buf.is_empty() {
            piece.push(InlineSpan::new(buf, span.style()));
        }
    }
    if !piece.is_empty() {
        out.push(piece);
    }
    out
}

/// Cut text to at most `max_width` columns without an ellipsis.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

/// Cut text to `max_width` columns, marking the cut with a single `…`.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = truncate_text(text, max_width - 1);
    out.push('…');
    out
}

/// Cut spans to at most `max_width` columns.
pub fn truncate_spans(spans: &[InlineSpan], max_width: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken = truncate_text(span.text(), remaining);
        let taken_width = display_width(&taken);
        if !taken.is_empty() {
            out.push(InlineSpan::new(taken, span.style()));
        }
        if taken_width < display_width(span.text()) {
            break;
        }
        remaining -= taken_width;
    }
    out
}

/// Split text into spans, styling `[N]` footnote markers with `marker`.
///
/// Only a bracketed run of one or more ASCII digits counts as a marker.
pub fn footnote_spans(text: &str, base: InlineStyle, marker: InlineStyle) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            let close = i + 1 + digits;
            if digits > 0 && bytes.get(close) == Some(&b']') {
                if plain_start < i {
                    spans.push(InlineSpan::styled(&text[plain_start..i], base));
                }
                spans.push(InlineSpan::styled(&text[i..=close], marker));
                i = close + 1;
                plain_start = i;
                continue;
            }
        }
        i += 1;
    }
    if plain_start < text.len() {
        spans.push(InlineSpan::styled(&text[plain_start..], base));
    }
    spans
}

/// Format a count with comma thousands separators.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
