//! Document model.
//!
//! A [`Document`] is the ordered block representation of a web page plus
//! its footnoted links. The extractor produces it; everything downstream
//! only reads it.

mod types;

pub use types::{ContentBlock, Document, HeadingRef, Link};
