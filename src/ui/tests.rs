use std::rc::Rc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::style::Color;

use super::*;
use crate::app::{Message, Model, update};
use crate::document::{ContentBlock, Document, Link};
use crate::layout::LayoutEngine;

fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).unwrap()
}

fn draw(model: &Model, width: u16, height: u16) -> Terminal<TestBackend> {
    let mut terminal = create_test_terminal(width, height);
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

fn row_text(terminal: &Terminal<TestBackend>, row: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, row)].symbol())
        .collect()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| row_text(terminal, y))
        .collect::<Vec<_>>()
        .join("\n")
}

fn loading_model(width: u16, height: u16) -> Model {
    Model::new(
        "https://example.com/post",
        (width, height),
        Rc::new(LayoutEngine::default()),
    )
}

fn ready_model(width: u16, height: u16) -> Model {
    let document = Document::new(
        "Reading in the terminal",
        vec![
            ContentBlock::Heading {
                level: 2,
                text: "Setup".into(),
            },
            ContentBlock::Paragraph("Install the tool [1] first.".into()),
            ContentBlock::Paragraph("Then open any page.".into()),
        ],
        vec![Link {
            index: 1,
            text: "tool".into(),
            url: "https://example.com/tool".into(),
        }],
    );
    update(
        loading_model(width, height),
        Message::Loaded(Box::new(document)),
    )
}

fn commit_search(model: Model, query: &str) -> Model {
    let mut model = update(model, Message::StartSearch);
    for c in query.chars() {
        model = update(model, Message::PromptInput(c));
    }
    update(model, Message::PromptCommit)
}

#[test]
fn test_loading_view_shows_spinner_and_url() {
    let model = loading_model(60, 9);
    let terminal = draw(&model, 60, 9);
    let text = screen_text(&terminal);
    assert!(text.contains("Fetching https://example.com/post..."));
    assert!(text.contains(SPINNER_FRAMES[0]));
}

#[test]
fn test_spinner_advances_with_ticks() {
    let model = update(loading_model(60, 9), Message::Tick);
    let terminal = draw(&model, 60, 9);
    assert!(screen_text(&terminal).contains(SPINNER_FRAMES[1]));
}

#[test]
fn test_error_view_shows_message_and_quit_hint() {
    let model = update(loading_model(60, 9), Message::LoadFailed("HTTP 404".into()));
    let terminal = draw(&model, 60, 9);
    let text = screen_text(&terminal);
    assert!(text.contains("Error: HTTP 404"));
    assert!(text.contains("Press q to quit."));
}

#[test]
fn test_document_view_renders_layout_lines() {
    let model = ready_model(80, 30);
    let terminal = draw(&model, 80, 30);
    let text = screen_text(&terminal);
    assert!(text.contains("Reading in the terminal"));
    assert!(text.contains("Install the tool [1] first."));
    assert!(text.contains("https://example.com/tool"));
}

#[test]
fn test_footer_shows_key_help_and_percent() {
    let model = ready_model(120, 30);
    let terminal = draw(&model, 120, 30);
    let footer = row_text(&terminal, 29);
    assert!(footer.starts_with("[↑/k] up  [↓/j] down  [/] search"));
    assert!(footer.contains("[o] open link"));
    assert!(footer.trim_end().ends_with("100%"));
}

#[test]
fn test_footer_shows_match_count() {
    let model = commit_search(ready_model(140, 30), "tool");
    let terminal = draw(&model, 140, 30);
    assert!(row_text(&terminal, 29).contains("[1/3 matches]"));
}

#[test]
fn test_footer_shows_no_matches() {
    let model = commit_search(ready_model(140, 30), "zebra");
    let terminal = draw(&model, 140, 30);
    assert!(row_text(&terminal, 29).contains("[no matches]"));
}

#[test]
fn test_footer_shows_live_search_prompt() {
    let model = update(ready_model(80, 30), Message::StartSearch);
    let model = update(model, Message::PromptInput('t'));
    let terminal = draw(&model, 80, 30);
    assert_eq!(row_text(&terminal, 29).trim_end(), "/t");
}

#[test]
fn test_footer_shows_link_prompt() {
    let model = update(ready_model(80, 30), Message::StartLinkPrompt);
    let model = update(model, Message::PromptInput('1'));
    let model = update(model, Message::PromptInput('2'));
    let terminal = draw(&model, 80, 30);
    assert_eq!(row_text(&terminal, 29).trim_end(), "Open link #: 12");
}

#[test]
fn test_search_hits_are_highlighted() {
    let model = commit_search(ready_model(80, 30), "install");
    let line = model
        .search
        .as_ref()
        .and_then(|s| s.current_line())
        .unwrap();
    let row = u16::try_from(line - model.viewport.offset()).unwrap();

    let terminal = draw(&model, 80, 30);
    let text = row_text(&terminal, row);
    let col = u16::try_from(text.find("Install").unwrap()).unwrap();
    let buffer = terminal.backend().buffer();
    assert_eq!(buffer[(col, row)].bg, Color::Indexed(205));
    assert_eq!(buffer[(col, row)].fg, Color::Indexed(0));
    // The whole matched line is highlighted, not just the hit.
    assert_eq!(buffer[(col + 8, row)].bg, Color::Indexed(205));
    let other = u16::try_from(text.find("first").unwrap()).unwrap();
    assert_eq!(buffer[(other, row)].bg, Color::Indexed(205));
}

#[test]
fn test_cleared_search_removes_highlight() {
    let model = commit_search(ready_model(80, 30), "install");
    let line = model
        .search
        .as_ref()
        .and_then(|s| s.current_line())
        .unwrap();
    let model = update(model, Message::ClearSearch);
    let row = u16::try_from(line - model.viewport.offset()).unwrap();

    let terminal = draw(&model, 80, 30);
    let col = u16::try_from(row_text(&terminal, row).find("Install").unwrap()).unwrap();
    assert_ne!(terminal.backend().buffer()[(col, row)].bg, Color::Indexed(205));
}

#[test]
fn test_scrolled_view_starts_at_offset() {
    let model = update(ready_model(80, 6), Message::GoToBottom);
    let expected = model.layout.lines()[model.viewport.offset()].content().to_string();
    let terminal = draw(&model, 80, 6);
    assert_eq!(row_text(&terminal, 0).trim_end(), expected.trim_end());
}
