use crate::app::{Model, Phase};
use crate::document::Document;
use crate::search::SearchState;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Scroll up half page
    HalfPageUp,
    /// Scroll down half page
    HalfPageDown,
    /// Go to beginning of document
    GoToTop,
    /// Go to end of document
    GoToBottom,
    /// Jump to the next heading
    NextSection,
    /// Jump to the previous heading
    PrevSection,

    // Prompts
    /// Open the search prompt
    StartSearch,
    /// Open the link number prompt
    StartLinkPrompt,
    /// Type a character into the active prompt
    PromptInput(char),
    /// Delete the last prompt character
    PromptBackspace,
    /// Submit the active prompt
    PromptCommit,
    /// Close the active prompt without acting
    PromptCancel,

    // Search
    /// Go to next search match
    NextMatch,
    /// Go to previous match
    PrevMatch,
    /// Clear search
    ClearSearch,

    // Loading
    /// Background fetch and extraction finished
    Loaded(Box<Document>),
    /// Background fetch or extraction failed
    LoadFailed(String),
    /// Spinner animation step
    Tick,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Quit => model.should_quit = true,
        Message::Resize(width, height) => {
            model.viewport.resize(width, height.saturating_sub(1));
            if !model.is_loading() {
                model.relayout();
            }
        }
        Message::Loaded(document) => {
            if model.is_loading() {
                model.document = Some(*document);
                model.phase = Phase::Ready;
                model.relayout();
                model.viewport.go_to_top();
            }
        }
        Message::LoadFailed(reason) => {
            if model.is_loading() {
                model.phase = Phase::Error(reason);
            }
        }
        Message::Tick => {
            if model.is_loading() {
                model.spinner_frame = model.spinner_frame.wrapping_add(1);
            }
        }
        Message::StartSearch
        | Message::StartLinkPrompt
        | Message::PromptInput(_)
        | Message::PromptBackspace
        | Message::PromptCommit
        | Message::PromptCancel => update_prompt(&mut model, msg),
        _ if model.phase == Phase::Ready => update_ready(&mut model, msg),
        _ => {}
    }
    model
}

fn update_ready(model: &mut Model, msg: Message) {
    match msg {
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::HalfPageUp => model.viewport.half_page_up(),
        Message::HalfPageDown => model.viewport.half_page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => model.viewport.go_to_bottom(),
        Message::NextSection => {
            if let Some(line) = next_section(
                model.layout.heading_offsets(),
                model.viewport.offset(),
                model.viewport.max_offset(),
            ) {
                model.viewport.go_to_line(line);
            }
        }
        Message::PrevSection => {
            if let Some(line) = prev_section(model.layout.heading_offsets(), model.viewport.offset())
            {
                model.viewport.go_to_line(line);
            }
        }
        Message::NextMatch => {
            if let Some(line) = model.search.as_mut().and_then(SearchState::next) {
                model.viewport.go_to_line(line);
            }
        }
        Message::PrevMatch => {
            if let Some(line) = model.search.as_mut().and_then(SearchState::prev) {
                model.viewport.go_to_line(line);
            }
        }
        Message::ClearSearch => model.search = None,
        _ => {}
    }
}

fn update_prompt(model: &mut Model, msg: Message) {
    let phase = model.phase.clone();
    match (phase, msg) {
        (Phase::Ready, Message::StartSearch) => {
            model.input.clear();
            model.phase = Phase::Searching;
        }
        (Phase::Ready, Message::StartLinkPrompt) if model.has_links() => {
            model.input.clear();
            model.phase = Phase::LinkPrompt;
        }
        (Phase::Searching, Message::PromptInput(c)) => model.input.push(c),
        (Phase::LinkPrompt, Message::PromptInput(c)) if c.is_ascii_digit() => {
            model.input.push(c);
        }
        (Phase::Searching | Phase::LinkPrompt, Message::PromptBackspace) => {
            model.input.pop();
        }
        (Phase::Searching, Message::PromptCommit) => {
            let query = std::mem::take(&mut model.input);
            model.phase = Phase::Ready;
            if query.is_empty() {
                return;
            }
            let search = SearchState::new(query, model.layout.lines());
            if let Some(line) = search.current_line() {
                model.viewport.go_to_line(line);
            }
            tracing::debug!(
                query = search.query(),
                matches = search.matches().len(),
                "search committed"
            );
            model.search = Some(search);
        }
        (Phase::Searching, Message::PromptCancel) => {
            model.input.clear();
            model.search = None;
            model.phase = Phase::Ready;
        }
        (Phase::LinkPrompt, Message::PromptCommit) => {
            let input = std::mem::take(&mut model.input);
            model.phase = Phase::Ready;
            if let Ok(index) = input.parse::<usize>()
                && let Some(link) = model.document.as_ref().and_then(|doc| doc.link(index))
            {
                model.pending_open = Some(link.url.clone());
            }
        }
        (Phase::LinkPrompt, Message::PromptCancel) => {
            model.input.clear();
            model.phase = Phase::Ready;
        }
        _ => {}
    }
}

/// Smallest heading offset below `top`, wrapping to the first heading.
///
/// Offsets are compared after clamping to `max_offset`, so headings on the
/// last page wrap instead of pinning the view there.
pub(super) fn next_section(offsets: &[usize], top: usize, max_offset: usize) -> Option<usize> {
    offsets
        .iter()
        .copied()
        .find(|&offset| offset.min(max_offset) > top)
        .or_else(|| offsets.first().copied())
}

/// Largest heading offset above `top`, wrapping to the last heading.
pub(super) fn prev_section(offsets: &[usize], top: usize) -> Option<usize> {
    offsets
        .iter()
        .rev()
        .copied()
        .find(|&offset| offset < top)
        .or_else(|| offsets.last().copied())
}
