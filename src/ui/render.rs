use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, Phase};
use crate::layout::RenderedLine;
use crate::search::SearchState;

use super::{status, style};

/// Braille dot spinner shown while the page loads.
pub const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    match &model.phase {
        Phase::Loading => render_loading(model, frame, area),
        Phase::Error(message) => render_error(message, frame, area),
        Phase::Ready | Phase::Searching | Phase::LinkPrompt => {
            let [content, footer] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            render_document(model, frame, content);
            status::render_footer(model, frame, footer);
        }
    }
}

/// Blank rows that push a message a third of the way down.
fn top_padding(area: Rect) -> Vec<Line<'static>> {
    vec![Line::default(); usize::from(area.height / 3)]
}

fn render_loading(model: &Model, frame: &mut Frame, area: Rect) {
    let spinner = SPINNER_FRAMES[model.spinner_frame % SPINNER_FRAMES.len()];
    let mut lines = top_padding(area);
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(spinner, style::accent()),
        Span::raw(" "),
        Span::styled("Fetching", style::accent_bold()),
        Span::raw(" "),
        Span::styled(model.url.clone(), style::link()),
        Span::styled("...", style::accent_bold()),
    ]));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_error(message: &str, frame: &mut Frame, area: Rect) {
    let mut lines = top_padding(area);
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Error:", style::accent_bold()),
        Span::raw(" "),
        Span::raw(message.to_string()),
    ]));
    lines.push(Line::default());
    lines.push(Line::styled("  Press q to quit.", style::muted()));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let range = model.viewport.visible_range();
    let start = range.start;
    let visible = model.layout.lines().get(range).unwrap_or_default();

    let content: Vec<Line> = visible
        .iter()
        .enumerate()
        .map(|(idx, line)| to_line(line, model.search.as_ref(), start + idx))
        .collect();
    frame.render_widget(Paragraph::new(content), area);
}

fn to_line(line: &RenderedLine, search: Option<&SearchState>, line_idx: usize) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .spans()
        .iter()
        .map(|span| Span::styled(span.text().to_string(), style::style_for_inline(span.style())))
        .collect();

    let Some(search) = search.filter(|s| s.is_match(line_idx)) else {
        return Line::from(spans);
    };
    let hit_style = if search.is_current(line_idx) {
        style::current_match_style()
    } else {
        style::match_style()
    };
    Line::from(highlight_spans(spans, hit_style))
}

/// Wrap every span of a matched line in the hit style.
fn highlight_spans(spans: Vec<Span<'static>>, hit: Style) -> Vec<Span<'static>> {
    spans
        .into_iter()
        .map(|span| {
            let patched = span.style.patch(hit);
            span.style(patched)
        })
        .collect()
}
