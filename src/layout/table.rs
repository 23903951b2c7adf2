//! Box-drawn table rendering.

use super::palette::{self, ACCENT, CELL};
use super::types::{InlineSpan, InlineStyle, LineType, RenderedLine};
use super::wrap::{display_width, truncate_with_ellipsis};

const INDENT: &str = "  ";

/// Render a table so that every line, indent included, fits in `width`.
///
/// Rows may be ragged; missing cells render as empty padded cells.
pub fn render_table(rows: &[Vec<String>], header: bool, width: usize) -> Vec<RenderedLine> {
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }

    let available = width.saturating_sub(INDENT.len());
    let col_widths = column_widths(rows, num_cols, available);

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(border_line(&col_widths, '┌', '┬', '┐'));
    for (idx, row) in rows.iter().enumerate() {
        let is_header = header && idx == 0;
        lines.push(row_line(row, &col_widths, is_header));
        if is_header {
            lines.push(border_line(&col_widths, '├', '┼', '┤'));
        }
    }
    lines.push(border_line(&col_widths, '└', '┴', '┘'));
    lines
}

/// Natural column widths, shrunk proportionally when the table is too wide.
///
/// A row is `1 + sum(col_width + 3)` columns wide.
fn column_widths(rows: &[Vec<String>], num_cols: usize, available: usize) -> Vec<usize> {
    let mut widths = vec![1_usize; num_cols];
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let overhead = 1 + 3 * num_cols;
    let natural: usize = widths.iter().sum();
    if natural + overhead > available {
        let room = available.saturating_sub(overhead).max(num_cols);
        for w in &mut widths {
            *w = (*w * room / natural).max(1);
        }
        // Flooring at 1 can push the sum back over `room`.
        let mut excess = widths.iter().sum::<usize>().saturating_sub(room);
        while excess > 0 {
            let Some(widest) = widths.iter_mut().filter(|w| **w > 1).max_by_key(|w| **w) else {
                break;
            };
            *widest -= 1;
            excess -= 1;
        }
    }
    widths
}

fn border_line(widths: &[usize], left: char, middle: char, right: char) -> RenderedLine {
    let mut out = String::from(INDENT);
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    RenderedLine::styled(LineType::Table, out, palette::border())
}

fn row_line(cells: &[String], widths: &[usize], is_header: bool) -> RenderedLine {
    let cell_style = if is_header {
        InlineStyle::fg(ACCENT).bold()
    } else {
        InlineStyle::fg(CELL)
    };
    let bar = || InlineSpan::styled("│", palette::border());

    let mut spans = vec![InlineSpan::plain(INDENT), bar()];
    for (idx, width) in widths.iter().copied().enumerate() {
        let content = cells.get(idx).map_or("", String::as_str);
        let content = truncate_with_ellipsis(content, width);
        let padding = width.saturating_sub(display_width(&content));
        spans.push(InlineSpan::plain(" "));
        spans.push(InlineSpan::styled(
            format!("{content}{}", " ".repeat(padding)),
            cell_style,
        ));
        spans.push(InlineSpan::plain(" "));
        spans.push(bar());
    }
    RenderedLine::from_spans(LineType::Table, spans)
}
