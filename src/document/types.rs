//! Core document types.

/// One structural unit of an extracted page.
///
/// Text payloads are whitespace-normalized and already carry their
/// footnote markers (`text [N]`). `Code` is the exception: its text is
/// kept verbatim, line breaks and interior whitespace included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Section heading, level 1 through 6
    Heading { level: u8, text: String },
    /// Body paragraph
    Paragraph(String),
    /// Preformatted code with an optional language hint
    Code {
        text: String,
        language: Option<String>,
    },
    /// Bulleted or numbered list
    List { ordered: bool, items: Vec<String> },
    /// Block quotation
    Quote(String),
    /// Image reference; `url` is absolute or empty
    Image { alt: String, url: String },
    /// Table rows; rows may have differing lengths
    Table { rows: Vec<Vec<String>>, header: bool },
    /// Thematic break
    HorizontalRule,
}

impl ContentBlock {
    /// Number of whitespace-delimited words that count toward reading time.
    ///
    /// Only prose counts: headings, paragraphs, quotes and list items.
    pub fn word_count(&self) -> usize {
        match self {
            Self::Heading { text, .. } | Self::Paragraph(text) | Self::Quote(text) => {
                text.split_whitespace().count()
            }
            Self::List { items, .. } => items
                .iter()
                .map(|item| item.split_whitespace().count())
                .sum(),
            Self::Code { .. } | Self::Image { .. } | Self::Table { .. } | Self::HorizontalRule => {
                0
            }
        }
    }

    pub const fn is_heading(&self) -> bool {
        matches!(self, Self::Heading { .. })
    }
}

/// A footnoted hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// 1-based position in document order
    pub index: usize,
    /// Visible anchor text
    pub text: String,
    /// Absolute target URL
    pub url: String,
}

/// Reference to a heading block, used for section navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingRef<'a> {
    pub level: u8,
    pub text: &'a str,
}

/// An extracted web page.
///
/// Built once by the extractor and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    title: String,
    author: String,
    site_name: String,
    blocks: Vec<ContentBlock>,
    links: Vec<Link>,
}

impl Document {
    /// Create a document from its blocks and links.
    pub fn new(title: impl Into<String>, blocks: Vec<ContentBlock>, links: Vec<Link>) -> Self {
        Self {
            title: title.into(),
            author: String::new(),
            site_name: String::new(),
            blocks,
            links,
        }
    }

    /// Create a document with no content.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new(), Vec::new())
    }

    /// Set the byline author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the publishing site name.
    #[must_use]
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Content blocks in document order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Footnoted links in index order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Look up a link by its 1-based index.
    pub fn link(&self, index: usize) -> Option<&Link> {
        index
            .checked_sub(1)
            .and_then(|i| self.links.get(i))
            .filter(|link| link.index == index)
            .or_else(|| self.links.iter().find(|link| link.index == index))
    }

    /// Iterate over heading blocks in document order.
    pub fn headings(&self) -> impl Iterator<Item = HeadingRef<'_>> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::Heading { level, text } => Some(HeadingRef {
                level: *level,
                text: text.as_str(),
            }),
            _ => None,
        })
    }

    /// Words of prose across the document.
    pub fn word_count(&self) -> usize {
        self.blocks.iter().map(ContentBlock::word_count).sum()
    }

    /// True when the document has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
