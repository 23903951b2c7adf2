//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Layout-to-ratatui style conversion and highlight styles

pub mod style;
pub mod viewport;

mod render;
mod status;

pub use render::{SPINNER_FRAMES, render};

#[cfg(test)]
mod tests;
