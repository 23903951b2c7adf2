use std::rc::Rc;

use crate::document::Document;
use crate::layout::{Layout, LayoutEngine, MAX_WIDTH};
use crate::search::SearchState;
use crate::ui::viewport::Viewport;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the background fetch to report back
    #[default]
    Loading,
    /// Document on screen, normal navigation keys active
    Ready,
    /// Typing a search query
    Searching,
    /// Typing a link number
    LinkPrompt,
    /// Fetch or extraction failed; only quit is accepted
    Error(String),
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug, Default)]
pub struct Model {
    pub phase: Phase,
    /// Page being shown, already normalized
    pub url: String,
    /// Extracted page, set once loading completes
    pub document: Option<Document>,
    /// Rendered lines for the current width
    pub layout: Layout,
    /// Scroll position over `layout`; its height excludes the footer row
    pub viewport: Viewport,
    /// Live text of the search or link prompt
    pub input: String,
    /// Committed search, if any
    pub search: Option<SearchState>,
    /// URL picked in the link prompt, consumed by the side-effect step
    pub pending_open: Option<String>,
    pub should_quit: bool,
    /// Advanced by ticks while loading
    pub spinner_frame: usize,
    /// Upper bound on the layout width
    pub max_width: usize,
    engine: Rc<LayoutEngine>,
}

impl Model {
    /// Create a loading model for a terminal of `size` columns by rows.
    pub fn new(url: impl Into<String>, size: (u16, u16), engine: Rc<LayoutEngine>) -> Self {
        let (width, height) = size;
        Self {
            url: url.into(),
            viewport: Viewport::new(width, height.saturating_sub(1), 0),
            max_width: MAX_WIDTH,
            engine,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width.min(MAX_WIDTH);
        self
    }

    /// Width handed to the layout engine.
    pub fn layout_width(&self) -> usize {
        usize::from(self.viewport.width()).min(self.max_width)
    }

    /// Re-render the document at the current width and refresh search matches.
    pub fn relayout(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        self.layout = self.engine.render(document, self.layout_width());
        self.viewport.set_total_lines(self.layout.line_count());
        if let Some(search) = self.search.as_mut() {
            search.refresh(self.layout.lines());
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn has_links(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|document| !document.links().is_empty())
    }
}
