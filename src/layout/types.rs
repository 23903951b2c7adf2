//! Styled line types produced by the layout engine.

/// Semantic kind of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Bordered title box
    Title,
    /// Section divider between headings
    Divider,
    /// Heading (level 1-6)
    Heading(u8),
    /// Paragraph text
    Paragraph,
    /// List item text
    ListItem,
    /// Block quote
    Quote,
    /// Code block, box borders included
    CodeBlock,
    /// Table border or row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Header of the trailing images or links section
    SectionHeader,
    /// Image raster, ASCII art, caption or placeholder
    Image,
    /// Entry in the trailing links section
    LinkEntry,
    /// Empty line
    Empty,
}

/// Color of a span, either from the 256-color palette or true color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineColor {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    pub underline: bool,
    pub fg: Option<InlineColor>,
    pub bg: Option<InlineColor>,
}

impl InlineStyle {
    /// Style with only a palette foreground color.
    pub const fn fg(index: u8) -> Self {
        Self {
            bold: false,
            italic: false,
            dim: false,
            underline: false,
            fg: Some(InlineColor::Indexed(index)),
            bg: None,
        }
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    #[must_use]
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    /// Unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text.into(), InlineStyle::default())
    }

    pub fn styled(text: impl Into<String>, style: InlineStyle) -> Self {
        Self::new(text.into(), style)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Visible text, used for search and plain output
    content: String,
    line_type: LineType,
    spans: Vec<InlineSpan>,
    /// Hyperlink target for terminals that support OSC 8
    hyperlink: Option<String>,
    /// Raw terminal escape emitted instead of the spans in styled output
    passthrough: Option<String>,
}

impl RenderedLine {
    /// Create a line from styled spans; the content is their concatenation.
    pub fn from_spans(line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        let content = spans.iter().map(InlineSpan::text).collect();
        Self {
            content,
            line_type,
            spans,
            hyperlink: None,
            passthrough: None,
        }
    }

    /// Create a line with a single styled span.
    pub fn styled(line_type: LineType, text: impl Into<String>, style: InlineStyle) -> Self {
        Self::from_spans(line_type, vec![InlineSpan::styled(text, style)])
    }

    pub fn empty() -> Self {
        Self::from_spans(LineType::Empty, Vec::new())
    }

    /// A line whose styled form is a raw escape sequence, such as an inline image.
    pub fn passthrough(line_type: LineType, escape: String) -> Self {
        Self {
            passthrough: Some(escape),
            ..Self::from_spans(line_type, Vec::new())
        }
    }

    #[must_use]
    pub fn with_hyperlink(mut self, url: impl Into<String>) -> Self {
        self.hyperlink = Some(url.into());
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }

    pub fn hyperlink(&self) -> Option<&str> {
        self.hyperlink.as_deref()
    }

    pub fn passthrough_escape(&self) -> Option<&str> {
        self.passthrough.as_deref()
    }
}
