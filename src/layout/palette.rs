//! 256-color palette used by the layout engine.

use super::types::InlineStyle;

pub const ACCENT: u8 = 205;
pub const HEADING_2: u8 = 212;
pub const HEADING_DEEP: u8 = 218;
pub const MUTED: u8 = 243;
pub const DIVIDER: u8 = 238;
pub const BORDER: u8 = 240;
pub const CODE: u8 = 228;
pub const LINK: u8 = 86;
pub const CELL: u8 = 252;

pub const fn muted() -> InlineStyle {
    InlineStyle::fg(MUTED)
}

/// Style of `[N]` reference markers in running text.
pub const fn footnote() -> InlineStyle {
    InlineStyle::fg(LINK).bold()
}

pub const fn border() -> InlineStyle {
    InlineStyle::fg(BORDER)
}

pub const fn divider() -> InlineStyle {
    InlineStyle::fg(DIVIDER)
}
