// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. image::ImageRasterizer)
    clippy::module_name_repetitions
)]

//! # getwebsite
//!
//! Read any web page in the terminal as a clean, navigable document.
//!
//! A page goes through three stages:
//! - **Extraction**: HTML is reduced to the readable article body, a flat
//!   list of content blocks with numbered footnote links
//! - **Layout**: blocks are wrapped and styled into terminal lines at a
//!   given width, with syntax-highlighted code and rasterized images
//! - **Navigation**: an interactive reader with search, section jumps
//!   and link opening, or plain output for pipes
//!
//! ## Architecture
//!
//! The reader uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: Extracted page model
//! - [`extract`]: HTML to document extraction
//! - [`layout`]: Document to styled lines
//! - [`ui`]: Terminal UI components
//! - [`search`]: Search over rendered lines
//! - [`highlight`]: Syntax highlighting
//! - [`image`]: Image fetching and rasterization
//! - [`fetch`]: Page download
//! - [`export`]: Markdown export

pub mod app;
pub mod config;
pub mod document;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod highlight;
pub mod image;
pub mod layout;
pub mod perf;
pub mod search;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{ContentBlock, Document, Link};
    pub use crate::layout::{Layout, LayoutEngine};
    pub use crate::ui::viewport::Viewport;
}
