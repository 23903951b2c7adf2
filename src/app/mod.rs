//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! The page is fetched on a background thread whose single result arrives
//! as [`Message::Loaded`] or [`Message::LoadFailed`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::{LinkOpener, SystemOpener};
pub use event_loop::load_page;
pub use model::{Model, Phase};
pub use update::{Message, update};

use std::rc::Rc;

use crate::fetch::Fetcher;
use crate::layout::{LayoutEngine, MAX_WIDTH};

/// Main application struct that owns the collaborators and runs the event loop.
pub struct App {
    url: String,
    engine: Rc<LayoutEngine>,
    fetcher: Option<Box<dyn Fetcher + Send>>,
    opener: Box<dyn LinkOpener>,
    max_width: usize,
}

impl App {
    /// Create a new application for the given page URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            engine: Rc::new(LayoutEngine::default()),
            fetcher: None,
            opener: Box::new(SystemOpener),
            max_width: MAX_WIDTH,
        }
    }

    /// Use a specific layout engine (highlighter and image collaborators).
    #[must_use]
    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = Rc::new(engine);
        self
    }

    /// Replace the HTTP fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetcher + Send>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Replace the browser launcher.
    #[must_use]
    pub fn with_opener(mut self, opener: Box<dyn LinkOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Cap the layout width below the terminal width.
    #[must_use]
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width.min(MAX_WIDTH);
        self
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("url", &self.url)
            .field("engine", &self.engine)
            .field("max_width", &self.max_width)
            .finish_non_exhaustive()
    }
}
