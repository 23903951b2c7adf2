use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, Phase};
use crate::layout::display_width;

use super::style;

const KEY_HELP: [(&str, &str); 7] = [
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("/", "search"),
    ("n/N", "next/prev"),
    ("]/[", "sections"),
    ("o", "open link"),
    ("q", "quit"),
];

/// One-row footer: live prompt input, or key help with match info and
/// the scroll percentage at the right edge.
pub fn render_footer(model: &Model, frame: &mut Frame, area: Rect) {
    let line = match model.phase {
        Phase::Searching => Line::from(vec![
            Span::styled("/", style::accent_bold()),
            Span::raw(model.input.clone()),
        ]),
        Phase::LinkPrompt => Line::from(vec![
            Span::styled("Open link #: ", style::link_bold()),
            Span::raw(model.input.clone()),
        ]),
        _ => help_line(model, usize::from(area.width)),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn help_line(model: &Model, width: usize) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, (key, desc)) in KEY_HELP.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!("[{key}]"), style::accent()));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*desc, style::muted()));
    }
    if let Some(search) = model.search.as_ref() {
        spans.push(Span::styled(format!("  {}", search.status()), style::muted()));
    }

    let percent = format!("{:>3}%", model.viewport.scroll_percent());
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let gap = width
        .saturating_sub(used + display_width(&percent) + 2)
        .max(1);
    spans.push(Span::raw(" ".repeat(gap)));
    spans.push(Span::styled(percent, style::accent()));
    Line::from(spans)
}
