//! Case-insensitive search over rendered lines.

use crate::layout::RenderedLine;

/// Indices of rendered lines whose visible text contains `query`, ignoring case.
///
/// An empty query matches nothing.
pub fn find_matches(lines: &[RenderedLine], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.content().to_lowercase().contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// A committed search: its query, matching line indices and the selected match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    matches: Vec<usize>,
    current: usize,
}

impl SearchState {
    pub fn new(query: impl Into<String>, lines: &[RenderedLine]) -> Self {
        let query = query.into();
        let matches = find_matches(lines, &query);
        Self {
            query,
            matches,
            current: 0,
        }
    }

    /// Recompute matches after a relayout, keeping the selection in range.
    pub fn refresh(&mut self, lines: &[RenderedLine]) {
        self.matches = find_matches(lines, &self.query);
        self.current = self.current.min(self.matches.len().saturating_sub(1));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Line index of the selected match.
    pub fn current_line(&self) -> Option<usize> {
        self.matches.get(self.current).copied()
    }

    /// Advance to the next match, wrapping after the last.
    pub fn next(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current_line()
    }

    /// Step back to the previous match, wrapping before the first.
    pub fn prev(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.matches.len() - 1);
        self.current_line()
    }

    pub fn is_match(&self, line: usize) -> bool {
        self.matches.binary_search(&line).is_ok()
    }

    pub fn is_current(&self, line: usize) -> bool {
        self.current_line() == Some(line)
    }

    /// Footer text, `[i/n matches]` or `[no matches]`.
    pub fn status(&self) -> String {
        if self.matches.is_empty() {
            "[no matches]".to_string()
        } else {
            format!("[{}/{} matches]", self.current + 1, self.matches.len())
        }
    }
}
