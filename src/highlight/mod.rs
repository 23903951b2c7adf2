//! Syntax highlighting for code blocks.
//!
//! [`CodeHighlighter`] is the port the layout engine calls; the default
//! implementation uses syntect with Sublime Text syntax definitions.

use std::sync::{Mutex, OnceLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::layout::{InlineColor, InlineSpan, InlineStyle};

/// Why a code block could not be highlighted.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("no syntax definition for language {0:?}")]
    UnknownLanguage(String),
    #[error("no language given")]
    NoLanguage,
    #[error("highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Token-level syntax coloring.
pub trait CodeHighlighter {
    /// Highlight `code`, returning one span list per source line.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError`] when the language is unknown or the
    /// highlighter fails; callers fall back to plain text.
    fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> Result<Vec<Vec<InlineSpan>>, HighlightError>;
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> Result<Vec<Vec<InlineSpan>>, HighlightError> {
        let syntax_set = syntax_set();
        // Declared language first, then detection from a shebang style first line.
        let syntax = language
            .and_then(|lang| {
                syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| syntax_set.find_syntax_by_name(lang))
            })
            .or_else(|| syntax_set.find_syntax_by_first_line(code))
            .ok_or_else(|| {
                language.map_or(HighlightError::NoLanguage, |lang| {
                    HighlightError::UnknownLanguage(lang.to_string())
                })
            })?;

        let mode = background_mode();
        let mut highlighter = HighlightLines::new(syntax, theme());
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter.highlight_line(line, syntax_set)?;
            let spans = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        return None;
                    }
                    let fg = adjust_fg_for_background(
                        (style.foreground.r, style.foreground.g, style.foreground.b),
                        mode,
                    );
                    Some(InlineSpan::styled(
                        text,
                        InlineStyle {
                            fg: Some(InlineColor::Rgb(fg.0, fg.1, fg.2)),
                            ..InlineStyle::default()
                        },
                    ))
                })
                .collect();
            lines.push(spans);
        }
        Ok(lines)
    }
}

/// Highlighter that declines every block, so code renders in the plain
/// code color.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(
        &self,
        _code: &str,
        language: Option<&str>,
    ) -> Result<Vec<Vec<InlineSpan>>, HighlightError> {
        Err(language.map_or(HighlightError::NoLanguage, |lang| {
            HighlightError::UnknownLanguage(lang.to_string())
        }))
    }
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        let theme_set = ThemeSet::load_defaults();
        let preferred = match background_mode() {
            BackgroundMode::Dark => [
                "Monokai Extended",
                "base16-eighties.dark",
                "Solarized (dark)",
                "base16-ocean.dark",
            ]
            .as_slice(),
            BackgroundMode::Light => [
                "InspiredGitHub",
                "Solarized (light)",
                "base16-ocean.light",
            ]
            .as_slice(),
        };

        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }

        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackgroundMode {
    Dark,
    Light,
}

/// Forced terminal background for theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: OnceLock<Mutex<Option<HighlightBackground>>> = OnceLock::new();

/// Force a light or dark theme; `None` detects from `COLORFGBG`.
pub fn set_background_mode(mode: Option<HighlightBackground>) {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    let mut guard = match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = mode;
}

fn background_mode() -> BackgroundMode {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(guard) = lock.lock()
        && let Some(mode) = *guard
    {
        return match mode {
            HighlightBackground::Light => BackgroundMode::Light,
            HighlightBackground::Dark => BackgroundMode::Dark,
        };
    }
    background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let Some(value) = colorfgbg else {
        return BackgroundMode::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    match bg_str.parse::<u8>() {
        Ok(bg) if bg >= 7 => BackgroundMode::Light,
        _ => BackgroundMode::Dark,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn adjust_fg_for_background((r, g, b): (u8, u8, u8), mode: BackgroundMode) -> (u8, u8, u8) {
    if mode == BackgroundMode::Dark {
        return (r, g, b);
    }
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    if luma < 155.0 {
        return (r, g, b);
    }
    let darken = |c: u8| (f32::from(c) * 0.42).round() as u8;
    (darken(r), darken(g), darken(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust_produces_colored_spans() {
        let code = "fn main() {\n    let x = 1;\n}\n";
        let lines = SyntectHighlighter.highlight(code, Some("rust")).unwrap();

        assert_eq!(lines.len(), 3);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(has_color, "Expected at least one colored span for Rust");
    }

    #[test]
    fn test_highlight_preserves_line_text() {
        let code = "x = 1\nprint(x)";
        let lines = SyntectHighlighter.highlight(code, Some("py")).unwrap();
        let joined: Vec<String> = lines
            .iter()
            .map(|line| line.iter().map(InlineSpan::text).collect())
            .collect();
        assert_eq!(joined, vec!["x = 1", "print(x)"]);
    }

    #[test]
    fn test_unknown_language_is_an_error() {
        let result = SyntectHighlighter.highlight("just text", Some("nope-lang"));
        assert!(matches!(result, Err(HighlightError::UnknownLanguage(_))));
    }

    #[test]
    fn test_missing_language_is_an_error() {
        let result = SyntectHighlighter.highlight("text", None);
        assert!(matches!(result, Err(HighlightError::NoLanguage)));
    }

    #[test]
    fn test_missing_language_detected_from_shebang() {
        let lines = SyntectHighlighter
            .highlight("#!/bin/bash\necho hi\n", None)
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().flatten().any(|span| span.style().fg.is_some()));
    }

    #[test]
    fn test_unknown_language_detected_from_first_line() {
        let lines = SyntectHighlighter
            .highlight("#!/usr/bin/env python\nprint('hi')\n", Some("nope-lang"))
            .unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_plain_highlighter_always_declines() {
        assert!(PlainHighlighter.highlight("x", Some("rust")).is_err());
    }

    #[test]
    fn test_highlight_does_not_set_background_color() {
        let lines = SyntectHighlighter
            .highlight("fn main() {}", Some("rust"))
            .unwrap();
        assert!(lines.iter().flatten().all(|span| span.style().bg.is_none()));
    }

    #[test]
    fn test_colorfgbg_dark_background() {
        assert_eq!(
            background_mode_from_colorfgbg(Some("15;0")),
            BackgroundMode::Dark
        );
    }

    #[test]
    fn test_colorfgbg_light_background() {
        assert_eq!(
            background_mode_from_colorfgbg(Some("0;15")),
            BackgroundMode::Light
        );
    }

    #[test]
    fn test_light_mode_darkens_bright_fg() {
        let bright = (240, 230, 120);
        let adjusted = adjust_fg_for_background(bright, BackgroundMode::Light);
        assert!(adjusted.0 < bright.0);
        assert!(adjusted.1 < bright.1);
        assert!(adjusted.2 < bright.2);
    }
}
