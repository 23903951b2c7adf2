//! Width-aware layout of a [`Document`] into styled terminal lines.
//!
//! The engine walks the document once and appends to a line arena:
//! - A bordered title box with byline and reading time.
//! - Body blocks in order, each followed by a blank line. Image blocks are
//!   held back and rendered in a trailing images section.
//! - A numbered links section.
//!
//! Heading offsets are recorded as arena indices while the arena grows, so
//! section navigation can jump straight to them.

mod ansi;
pub mod palette;
mod table;
mod types;
mod wrap;

pub use ansi::to_crossterm_color;
pub use types::{InlineColor, InlineSpan, InlineStyle, LineType, RenderedLine};
pub use wrap::{display_width, format_thousands, wrap_spans};

use crate::document::{ContentBlock, Document, Link};
use crate::highlight::{CodeHighlighter, PlainHighlighter};
use crate::image::{FixedCapabilities, ImageRasterizer, NoImages, TerminalCapabilities};

use palette::{ACCENT, CODE, HEADING_2, HEADING_DEEP, LINK, MUTED};
use wrap::{footnote_spans, spans_width, truncate_spans, truncate_with_ellipsis};

/// Widest layout ever produced.
pub const MAX_WIDTH: usize = 90;
/// Narrowest layout; boxes underflow below this.
pub const MIN_WIDTH: usize = 20;
/// Reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 238;

const TAB_STOP: &str = "    ";

/// Clamp a terminal width to the range the layout supports.
pub fn clamp_width(width: usize) -> usize {
    width.clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Minutes to read `words` words, never less than one.
pub const fn reading_minutes(words: usize) -> usize {
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    if minutes == 0 { 1 } else { minutes }
}

/// Rendered output: the line arena plus heading offsets into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    lines: Vec<RenderedLine>,
    heading_offsets: Vec<usize>,
    width: usize,
}

impl Layout {
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    /// Arena index of each heading's first line, in document order.
    pub fn heading_offsets(&self) -> &[usize] {
        &self.heading_offsets
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Effective layout width after clamping.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Unstyled text, one line per arena entry.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line.content());
            out.push('\n');
        }
        out
    }

    /// Text with SGR styling, inline-image escapes, and, when `hyperlinks`
    /// is set, OSC 8 links on link URLs.
    pub fn to_ansi(&self, hyperlinks: bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            ansi::write_line(&mut out, line, hyperlinks);
        }
        out
    }
}

/// Line arena that records heading offsets as it grows.
#[derive(Default)]
struct Arena {
    lines: Vec<RenderedLine>,
    heading_offsets: Vec<usize>,
}

impl Arena {
    fn push(&mut self, line: RenderedLine) {
        self.lines.push(line);
    }

    fn push_spans(&mut self, line_type: LineType, rows: Vec<Vec<InlineSpan>>) {
        self.lines.extend(
            rows.into_iter()
                .map(|spans| RenderedLine::from_spans(line_type, spans)),
        );
    }

    fn blank(&mut self) {
        self.lines.push(RenderedLine::empty());
    }

    fn mark_heading(&mut self) {
        self.heading_offsets.push(self.lines.len());
    }

    fn finish(self, width: usize) -> Layout {
        Layout {
            lines: self.lines,
            heading_offsets: self.heading_offsets,
            width,
        }
    }
}

/// Lays documents out using the given highlighting and image collaborators.
pub struct LayoutEngine {
    highlighter: Box<dyn CodeHighlighter>,
    rasterizer: Box<dyn ImageRasterizer>,
    capabilities: Box<dyn TerminalCapabilities>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field(
                "inline_images",
                &self.capabilities.supports_inline_images(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for LayoutEngine {
    /// Plain code, placeholders for images.
    fn default() -> Self {
        Self::new(
            Box::new(PlainHighlighter),
            Box::new(NoImages),
            Box::new(FixedCapabilities(false)),
        )
    }
}

impl LayoutEngine {
    pub fn new(
        highlighter: Box<dyn CodeHighlighter>,
        rasterizer: Box<dyn ImageRasterizer>,
        capabilities: Box<dyn TerminalCapabilities>,
    ) -> Self {
        Self {
            highlighter,
            rasterizer,
            capabilities,
        }
    }

    /// Lay `document` out at `width` columns, clamped to
    /// [`MIN_WIDTH`]..=[`MAX_WIDTH`].
    pub fn render(&self, document: &Document, width: usize) -> Layout {
        let _scope = crate::perf::scope("layout.render");
        let width = clamp_width(width);
        let mut out = Arena::default();

        push_title(&mut out, document, width);

        let mut first = true;
        let mut images = Vec::new();
        for block in document.blocks() {
            match block {
                ContentBlock::Image { alt, url } => {
                    images.push((alt.as_str(), url.as_str()));
                    continue;
                }
                ContentBlock::Heading { level, text } => {
                    out.mark_heading();
                    if !first {
                        push_divider(&mut out, width);
                        out.blank();
                    }
                    push_heading(&mut out, *level, text, width);
                }
                ContentBlock::Paragraph(text) => push_paragraph(&mut out, text, width),
                ContentBlock::Code { text, language } => {
                    self.push_code(&mut out, text, language.as_deref(), width);
                }
                ContentBlock::List { ordered, items } => {
                    push_list(&mut out, *ordered, items, width);
                }
                ContentBlock::Quote(text) => push_quote(&mut out, text, width),
                ContentBlock::Table { rows, header } => {
                    for line in table::render_table(rows, *header, width) {
                        out.push(line);
                    }
                }
                ContentBlock::HorizontalRule => out.push(RenderedLine::styled(
                    LineType::HorizontalRule,
                    format!("  {}", "━".repeat(width - 4)),
                    InlineStyle::fg(palette::BORDER),
                )),
            }
            out.blank();
            first = false;
        }

        if !images.is_empty() {
            push_section_header(&mut out, "Images", width);
            for (alt, url) in images {
                self.push_image(&mut out, alt, url, width);
            }
        }

        if !document.links().is_empty() {
            push_section_header(&mut out, "Links", width);
            for link in document.links() {
                push_link(&mut out, link, width);
            }
        }

        let layout = out.finish(width);
        tracing::debug!(
            width,
            lines = layout.line_count(),
            headings = layout.heading_offsets().len(),
            "layout rendered"
        );
        layout
    }

    fn push_code(&self, out: &mut Arena, text: &str, language: Option<&str>, width: usize) {
        let box_width = width - 4;
        let inner = box_width - 4;
        let border = palette::border();

        let label = truncate_with_ellipsis(language.unwrap_or("code"), box_width.saturating_sub(6));
        let fill = box_width.saturating_sub(5 + display_width(&label));
        out.push(RenderedLine::from_spans(
            LineType::CodeBlock,
            vec![
                InlineSpan::plain("  "),
                InlineSpan::styled("╭─ ", border),
                InlineSpan::styled(label, palette::muted()),
                InlineSpan::styled(format!(" {}╮", "─".repeat(fill)), border),
            ],
        ));

        let rows = match self.highlighter.highlight(text, language) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::debug!(error = %err, "code block rendered without highlighting");
                text.lines()
                    .map(|line| vec![InlineSpan::styled(line, InlineStyle::fg(CODE))])
                    .collect()
            }
        };

        for row in rows {
            let expanded: Vec<InlineSpan> = row
                .iter()
                .map(|span| InlineSpan::new(span.text().replace('\t', TAB_STOP), span.style()))
                .collect();
            let body = truncate_spans(&expanded, inner);
            let padding = inner.saturating_sub(spans_width(&body));

            let mut spans = vec![InlineSpan::plain("  "), InlineSpan::styled("│ ", border)];
            spans.extend(body);
            spans.push(InlineSpan::plain(" ".repeat(padding)));
            spans.push(InlineSpan::styled(" │", border));
            out.push(RenderedLine::from_spans(LineType::CodeBlock, spans));
        }

        out.push(RenderedLine::styled(
            LineType::CodeBlock,
            format!("  ╰{}╯", "─".repeat(box_width - 2)),
            border,
        ));
    }

    /// Exactly one of inline raster, ASCII art, or placeholder.
    fn push_image(&self, out: &mut Arena, alt: &str, url: &str, width: usize) {
        let raster_width = width - 4;
        let caption_style = palette::muted().italic();

        if !url.is_empty() {
            let mut rendered = false;
            if self.capabilities.supports_inline_images() {
                match self.rasterizer.inline(url, raster_width) {
                    Ok(escape) => {
                        out.push(RenderedLine::passthrough(LineType::Image, format!("  {escape}")));
                        rendered = true;
                    }
                    Err(err) => tracing::debug!(url, error = %err, "inline image unavailable"),
                }
            }
            if !rendered {
                match self.rasterizer.ascii(url, raster_width) {
                    Ok(rows) if !rows.is_empty() => {
                        let rows = rows
                            .into_iter()
                            .map(|row| {
                                let mut spans = vec![InlineSpan::plain("  ")];
                                spans.extend(truncate_spans(&row, raster_width));
                                spans
                            })
                            .collect();
                        out.push_spans(LineType::Image, rows);
                        rendered = true;
                    }
                    Ok(_) => tracing::debug!(url, "ascii image came back empty"),
                    Err(err) => tracing::debug!(url, error = %err, "ascii image unavailable"),
                }
            }
            if rendered {
                if !alt.is_empty() {
                    let caption = [InlineSpan::styled(alt, caption_style)];
                    let indent = [InlineSpan::plain("  ")];
                    out.push_spans(LineType::Image, wrap_spans(&caption, width, &indent, &indent));
                }
                out.blank();
                return;
            }
        }

        let alt = if alt.is_empty() { "image" } else { alt };
        let placeholder = [InlineSpan::styled(format!("[IMAGE: {alt}]"), caption_style)];
        let indent = [InlineSpan::plain("  ")];
        out.push_spans(
            LineType::Image,
            wrap_spans(&placeholder, width, &indent, &indent),
        );
        out.blank();
    }
}

fn push_title(out: &mut Arena, document: &Document, width: usize) {
    let inner = width - 6;
    let border = palette::border();
    let meta = palette::muted();

    let mut content: Vec<Vec<InlineSpan>> = Vec::new();
    content.extend(wrap_spans(
        &[InlineSpan::styled(document.title(), InlineStyle::fg(ACCENT).bold())],
        inner,
        &[],
        &[],
    ));

    let byline = match (document.author(), document.site_name()) {
        ("", "") => None,
        (author, "") => Some(format!("by {author}")),
        ("", site) => Some(site.to_string()),
        (author, site) => Some(format!("by {author} · {site}")),
    };
    if let Some(byline) = byline {
        content.extend(wrap_spans(&[InlineSpan::styled(byline, meta)], inner, &[], &[]));
    }

    let words = document.word_count();
    let read_line = format!(
        "{} min read · {} words",
        reading_minutes(words),
        format_thousands(words)
    );
    content.push(vec![InlineSpan::styled(
        truncate_with_ellipsis(&read_line, inner),
        meta,
    )]);

    let horizontal = "─".repeat(width - 2);
    out.push(RenderedLine::styled(
        LineType::Title,
        format!("╭{horizontal}╮"),
        border,
    ));
    out.push(boxed_line(Vec::new(), inner));
    for row in content {
        out.push(boxed_line(row, inner));
    }
    out.push(boxed_line(Vec::new(), inner));
    out.push(RenderedLine::styled(
        LineType::Title,
        format!("╰{horizontal}╯"),
        border,
    ));
    out.blank();
}

fn boxed_line(row: Vec<InlineSpan>, inner: usize) -> RenderedLine {
    let border = palette::border();
    let padding = inner.saturating_sub(spans_width(&row));
    let mut spans = vec![InlineSpan::styled("│", border), InlineSpan::plain("  ")];
    spans.extend(row);
    spans.push(InlineSpan::plain(format!("{}  ", " ".repeat(padding))));
    spans.push(InlineSpan::styled("│", border));
    RenderedLine::from_spans(LineType::Title, spans)
}

fn push_divider(out: &mut Arena, width: usize) {
    out.push(RenderedLine::styled(
        LineType::Divider,
        format!("  {}", "─".repeat(width - 4)),
        palette::divider(),
    ));
}

fn push_section_header(out: &mut Arena, title: &str, width: usize) {
    push_divider(out, width);
    out.push(RenderedLine::styled(
        LineType::SectionHeader,
        format!("  {title}"),
        palette::muted().bold(),
    ));
    out.blank();
}

fn push_heading(out: &mut Arena, level: u8, text: &str, width: usize) {
    let (indent, arrow, arrow_style, text_style) = match level {
        1 => (0, "▸ ", InlineStyle::fg(ACCENT).bold(), InlineStyle::fg(ACCENT).bold()),
        2 => (
            0,
            "▸ ",
            InlineStyle::fg(HEADING_2).bold(),
            InlineStyle::fg(HEADING_2).bold(),
        ),
        deeper => (
            2 * usize::from(deeper.saturating_sub(2)),
            "▹ ",
            InlineStyle::fg(MUTED),
            InlineStyle::fg(HEADING_DEEP).bold(),
        ),
    };
    let lead = " ".repeat(indent);
    let first = [InlineSpan::plain(lead.clone()), InlineSpan::styled(arrow, arrow_style)];
    let next = [InlineSpan::plain(format!("{lead}  "))];
    let rows = wrap_spans(&[InlineSpan::styled(text, text_style)], width, &first, &next);
    out.push_spans(LineType::Heading(level), rows);
}

fn push_paragraph(out: &mut Arena, text: &str, width: usize) {
    let spans = footnote_spans(text, InlineStyle::default(), palette::footnote());
    let indent = [InlineSpan::plain(" ")];
    out.push_spans(
        LineType::Paragraph,
        wrap_spans(&spans, width - 1, &indent, &indent),
    );
}

fn push_list(out: &mut Arena, ordered: bool, items: &[String], width: usize) {
    let bullet = InlineStyle::fg(ACCENT);
    for (idx, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", idx + 1)
        } else {
            "•".to_string()
        };
        let first = [
            InlineSpan::plain("  "),
            InlineSpan::styled(marker, bullet),
            InlineSpan::plain(" "),
        ];
        let next = [InlineSpan::plain(" ".repeat(spans_width(&first)))];
        let spans = footnote_spans(item, InlineStyle::default(), palette::footnote());
        out.push_spans(LineType::ListItem, wrap_spans(&spans, width - 1, &first, &next));
    }
}

fn push_quote(out: &mut Arena, text: &str, width: usize) {
    let spans = footnote_spans(text, palette::muted().italic(), palette::footnote());
    let bar = [
        InlineSpan::plain("  "),
        InlineSpan::styled("┃", InlineStyle::fg(ACCENT).bold()),
        InlineSpan::plain(" "),
    ];
    out.push_spans(LineType::Quote, wrap_spans(&spans, width - 1, &bar, &bar));
}

fn push_link(out: &mut Arena, link: &Link, width: usize) {
    let marker = format!("[{}]", link.index);
    let first = [
        InlineSpan::plain("  "),
        InlineSpan::styled(marker.clone(), InlineStyle::fg(LINK).bold()),
        InlineSpan::plain(" "),
    ];
    let next = [InlineSpan::plain(" ".repeat(display_width(&marker) + 3))];
    let text = [InlineSpan::styled(link.text.as_str(), palette::muted())];
    out.push_spans(LineType::LinkEntry, wrap_spans(&text, width, &first, &next));

    let indent = [InlineSpan::plain("      ")];
    let url = [InlineSpan::styled(link.url.as_str(), InlineStyle::fg(LINK).underline())];
    for row in wrap_spans(&url, width, &indent, &indent) {
        out.push(
            RenderedLine::from_spans(LineType::LinkEntry, row).with_hyperlink(link.url.as_str()),
        );
    }
}

#[cfg(test)]
mod tests;
