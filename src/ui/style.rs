//! Conversion from layout styles to ratatui styles, plus the TUI-only
//! highlight and chrome styles.

use ratatui::style::{Color, Modifier, Style};

use crate::layout::palette::{ACCENT, LINK, MUTED};
use crate::layout::{InlineColor, InlineStyle};

pub const fn color(color: InlineColor) -> Color {
    match color {
        InlineColor::Indexed(idx) => Color::Indexed(idx),
        InlineColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

/// Translate a span style from the layout engine.
pub fn style_for_inline(inline: InlineStyle) -> Style {
    let mut style = Style::default();
    if let Some(fg) = inline.fg {
        style = style.fg(color(fg));
    }
    if let Some(bg) = inline.bg {
        style = style.bg(color(bg));
    }

    let mut modifiers = Modifier::empty();
    if inline.bold {
        modifiers |= Modifier::BOLD;
    }
    if inline.italic {
        modifiers |= Modifier::ITALIC;
    }
    if inline.dim {
        modifiers |= Modifier::DIM;
    }
    if inline.underline {
        modifiers |= Modifier::UNDERLINED;
    }
    style.add_modifier(modifiers)
}

/// Search hit on a matching line.
pub fn match_style() -> Style {
    Style::default()
        .bg(Color::Indexed(ACCENT))
        .fg(Color::Indexed(0))
        .add_modifier(Modifier::BOLD)
}

/// Search hit on the selected match line.
pub fn current_match_style() -> Style {
    match_style().add_modifier(Modifier::UNDERLINED)
}

pub fn accent() -> Style {
    Style::default().fg(Color::Indexed(ACCENT))
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(Color::Indexed(MUTED))
}

pub fn link() -> Style {
    Style::default().fg(Color::Indexed(LINK))
}

pub fn link_bold() -> Style {
    link().add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_for_inline_maps_colors_and_flags() {
        let inline = InlineStyle::fg(205).bold().italic();
        let style = style_for_inline(inline);
        assert_eq!(style.fg, Some(Color::Indexed(205)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
        assert!(!style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_style_for_inline_rgb() {
        let inline = InlineStyle {
            fg: Some(InlineColor::Rgb(1, 2, 3)),
            bg: Some(InlineColor::Indexed(4)),
            ..InlineStyle::default()
        };
        let style = style_for_inline(inline);
        assert_eq!(style.fg, Some(Color::Rgb(1, 2, 3)));
        assert_eq!(style.bg, Some(Color::Indexed(4)));
    }

    #[test]
    fn test_default_inline_is_unstyled() {
        assert_eq!(style_for_inline(InlineStyle::default()), Style::default());
    }

    #[test]
    fn test_current_match_is_stronger() {
        let current = current_match_style();
        assert!(current.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(current.bg, match_style().bg);
    }
}
