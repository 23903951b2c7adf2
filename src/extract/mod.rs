//! Web page extraction.
//!
//! Turns raw markup into a [`Document`]: an ordered list of content blocks
//! with every hyperlink replaced by a numbered footnote marker.
//!
//! Extraction never fails. Markup that cannot be parsed into a tree is
//! stripped down to a single paragraph of text.

mod text;
mod tree;

pub use text::{normalize_whitespace, resolve_url, strip_tags};
pub use tree::{DomNode, HtmlParser, MarkupNode, MarkupParser};

use tracing::{debug, warn};
use url::Url;

use crate::document::{ContentBlock, Document, Link};

use text::language_from_class;

/// Failure to build a tree from markup.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to read markup: {0}")]
    Read(#[from] std::io::Error),
    #[error("markup parser rejected input: {0}")]
    Rejected(String),
}

/// Subtrees that never contain article content.
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "aside", "form", "iframe", "svg",
    "button", "head", "input", "select", "textarea",
];

/// Containers that emit no block of their own.
const TRANSPARENT: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "center", "hgroup", "details",
    "summary",
];

/// Inline elements that flow with surrounding loose text.
const PHRASING: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "del", "ins", "br",
    "wbr", "font", "label",
];

/// Extract a document from HTML.
pub fn extract(markup: &[u8], base_url: &str) -> Document {
    extract_with(&HtmlParser, markup, base_url)
}

/// Extract a document using the given markup parser.
pub fn extract_with<P: MarkupParser>(parser: &P, markup: &[u8], base_url: &str) -> Document {
    let _scope = crate::perf::scope("extract.document");
    match parser.parse(markup) {
        Ok(root) => extract_tree(&root, base_url),
        Err(err) => {
            warn!(%err, "markup parse failed, falling back to stripped text");
            extract_fallback(markup, base_url)
        }
    }
}

/// Extract a document from an already parsed tree.
pub fn extract_tree<N: MarkupNode>(root: &N, base_url: &str) -> Document {
    let meta = PageMeta::read(root);
    let content_root = root
        .find_descendant("article")
        .or_else(|| root.find_descendant("main"))
        .or_else(|| root.find_descendant("body"));

    let mut walker = Walker::new(base_url);
    match &content_root {
        Some(node) => walker.walk_children(node),
        None => walker.walk_children(root),
    }

    let title = [meta.title, root.find_descendant("h1").map(|h| h.text_content())]
        .into_iter()
        .flatten()
        .map(|t| normalize_whitespace(&t))
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| base_url.to_string());

    debug!(
        blocks = walker.blocks.len(),
        links = walker.links.len(),
        "extracted document"
    );

    Document::new(title, walker.blocks, walker.links)
        .with_author(meta.author.unwrap_or_default())
        .with_site_name(meta.site_name.unwrap_or_default())
}

/// Best-effort document for markup that could not be parsed.
pub fn extract_fallback(markup: &[u8], base_url: &str) -> Document {
    let raw = String::from_utf8_lossy(markup);
    let stripped = strip_tags(&raw);
    let decoded = html_escape::decode_html_entities(&stripped);
    let text = normalize_whitespace(&decoded);
    let blocks = if text.is_empty() {
        Vec::new()
    } else {
        vec![ContentBlock::Paragraph(text)]
    };
    Document::new(base_url, blocks, Vec::new())
}

#[derive(Debug, Default)]
struct PageMeta {
    title: Option<String>,
    author: Option<String>,
    site_name: Option<String>,
}

impl PageMeta {
    fn read<N: MarkupNode>(root: &N) -> Self {
        let mut og_title = None;
        let mut author = None;
        let mut article_author = None;
        let mut site_name = None;

        for meta in root.find_all("meta") {
            let key = meta
                .attr("property")
                .or_else(|| meta.attr("name"))
                .map(|k| k.to_ascii_lowercase());
            let Some(content) = meta
                .attr("content")
                .map(|c| normalize_whitespace(&c))
                .filter(|c| !c.is_empty())
            else {
                continue;
            };
            match key.as_deref() {
                Some("og:title") => og_title = og_title.or(Some(content)),
                Some("author") => author = author.or(Some(content)),
                Some("article:author") => article_author = article_author.or(Some(content)),
                Some("og:site_name") => site_name = site_name.or(Some(content)),
                _ => {}
            }
        }

        let title = og_title.or_else(|| {
            root.find_descendant("title")
                .map(|t| normalize_whitespace(&t.text_content()))
                .filter(|t| !t.is_empty())
        });

        Self {
            title,
            author: author.or(article_author),
            site_name,
        }
    }
}

/// Accumulates blocks and links during the pre-order walk.
struct Walker {
    base: Option<Url>,
    blocks: Vec<ContentBlock>,
    links: Vec<Link>,
}

impl Walker {
    fn new(base_url: &str) -> Self {
        Self {
            base: Url::parse(base_url).ok(),
            blocks: Vec::new(),
            links: Vec::new(),
        }
    }

    fn walk_children<N: MarkupNode>(&mut self, node: &N) {
        let mut run: Vec<N> = Vec::new();
        for child in node.children() {
            if is_flow_content(&child) {
                run.push(child);
                continue;
            }
            self.flush_run(&mut run);
            self.walk_element(&child);
        }
        self.flush_run(&mut run);
    }

    /// Emit loose text and phrasing siblings as one paragraph.
    fn flush_run<N: MarkupNode>(&mut self, run: &mut Vec<N>) {
        if run.is_empty() {
            return;
        }
        let mut raw = String::new();
        for node in run.drain(..) {
            self.inline_node(&node, &mut raw);
        }
        self.push_paragraph(normalize_whitespace(&raw));
    }

    fn walk_element<N: MarkupNode>(&mut self, node: &N) {
        let Some(tag) = node.tag_name() else {
            return;
        };
        if SKIPPED.contains(&tag) {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<u8>().unwrap_or(1).clamp(1, 6);
                let text = self.inline_text(node);
                if !text.is_empty() {
                    self.blocks.push(ContentBlock::Heading { level, text });
                }
            }
            "blockquote" => {
                let text = self.inline_text(node);
                if !text.is_empty() {
                    self.blocks.push(ContentBlock::Quote(text));
                }
            }
            "ul" | "ol" => self.push_list(node, tag == "ol"),
            "pre" => self.push_code(node),
            "hr" => self.blocks.push(ContentBlock::HorizontalRule),
            "figure" | "picture" => self.push_figure(node),
            "img" => self.push_image(node),
            "table" => self.push_table(node),
            _ if TRANSPARENT.contains(&tag) => self.walk_children(node),
            // `p` and any unrecognized element
            _ => {
                let text = self.inline_text(node);
                self.push_paragraph(text);
            }
        }
    }

    fn push_paragraph(&mut self, text: String) {
        if !text.is_empty() {
            self.blocks.push(ContentBlock::Paragraph(text));
        }
    }

    fn push_list<N: MarkupNode>(&mut self, node: &N, ordered: bool) {
        let items: Vec<String> = node
            .children()
            .iter()
            .filter(|child| child.is_element("li"))
            .map(|li| self.inline_text(li))
            .filter(|item| !item.is_empty())
            .collect();
        if !items.is_empty() {
            self.blocks.push(ContentBlock::List { ordered, items });
        }
    }

    fn push_code<N: MarkupNode>(&mut self, pre: &N) {
        let code = pre.find_descendant("code");
        let raw = code
            .as_ref()
            .map_or_else(|| pre.text_content(), |c| c.text_content());
        let text = raw.trim_end().to_string();
        if text.is_empty() {
            return;
        }
        let language = code
            .as_ref()
            .and_then(|c| c.attr("class"))
            .and_then(|class| language_from_class(&class))
            .or_else(|| {
                pre.attr("class")
                    .and_then(|class| language_from_class(&class))
            });
        self.blocks.push(ContentBlock::Code { text, language });
    }

    fn push_figure<N: MarkupNode>(&mut self, figure: &N) {
        if let Some(img) = figure.find_descendant("img") {
            self.push_image(&img);
        }
        if let Some(caption) = figure.find_descendant("figcaption") {
            let text = self.inline_text(&caption);
            self.push_paragraph(text);
        }
    }

    fn push_image<N: MarkupNode>(&mut self, img: &N) {
        let alt = normalize_whitespace(&img.attr("alt").unwrap_or_default());
        let src = img
            .attr("src")
            .filter(|s| !s.trim().is_empty())
            .or_else(|| img.attr("data-src"))
            .unwrap_or_default();
        let url = resolve_url(self.base.as_ref(), &src);
        self.blocks.push(ContentBlock::Image { alt, url });
    }

    fn push_table<N: MarkupNode>(&mut self, table: &N) {
        let mut rows = Vec::new();
        let mut first_row_in_head = None;
        self.collect_rows(table, false, &mut rows, &mut first_row_in_head);

        if rows.iter().all(|(cells, _)| cells.iter().all(String::is_empty)) {
            return;
        }
        let header = first_row_in_head.unwrap_or(false) || rows.first().is_some_and(|(_, th)| *th);
        let rows = rows.into_iter().map(|(cells, _)| cells).collect();
        self.blocks.push(ContentBlock::Table { rows, header });
    }

    /// Gather `tr` rows as (cells, all-cells-are-th) pairs in document order.
    fn collect_rows<N: MarkupNode>(
        &mut self,
        node: &N,
        in_head: bool,
        rows: &mut Vec<(Vec<String>, bool)>,
        first_row_in_head: &mut Option<bool>,
    ) {
        for child in node.children() {
            match child.tag_name() {
                Some("tr") => {
                    let mut cells = Vec::new();
                    let mut all_th = true;
                    for cell in child.children() {
                        match cell.tag_name() {
                            Some("th") => cells.push(self.inline_text(&cell)),
                            Some("td") => {
                                all_th = false;
                                cells.push(self.inline_text(&cell));
                            }
                            _ => {}
                        }
                    }
                    if cells.is_empty() {
                        continue;
                    }
                    first_row_in_head.get_or_insert(in_head);
                    rows.push((cells, all_th));
                }
                Some("thead") => self.collect_rows(&child, true, rows, first_row_in_head),
                Some("table") | None => {}
                Some(_) => self.collect_rows(&child, in_head, rows, first_row_in_head),
            }
        }
    }

    /// Inline text of an element with links replaced by footnote markers.
    fn inline_text<N: MarkupNode>(&mut self, node: &N) -> String {
        let mut raw = String::new();
        for child in node.children() {
            self.inline_node(&child, &mut raw);
        }
        normalize_whitespace(&raw)
    }

    fn inline_node<N: MarkupNode>(&mut self, node: &N, out: &mut String) {
        if let Some(text) = node.text() {
            out.push_str(&text);
            return;
        }
        let Some(tag) = node.tag_name() else {
            return;
        };
        match tag {
            _ if SKIPPED.contains(&tag) => {}
            "br" => out.push(' '),
            "a" => self.inline_anchor(node, out),
            _ if PHRASING.contains(&tag) => {
                for child in node.children() {
                    self.inline_node(&child, out);
                }
            }
            // Block-level children keep a word boundary on both sides.
            _ => {
                out.push(' ');
                for child in node.children() {
                    self.inline_node(&child, out);
                }
                out.push(' ');
            }
        }
    }

    fn inline_anchor<N: MarkupNode>(&mut self, anchor: &N, out: &mut String) {
        let text = normalize_whitespace(&anchor.text_content());
        if text.is_empty() {
            return;
        }
        let href = anchor.attr("href").unwrap_or_default();
        let href = href.trim();
        if href.is_empty() || href == "#" {
            out.push_str(&text);
            return;
        }
        let index = self.links.len() + 1;
        self.links.push(Link {
            index,
            text: text.clone(),
            url: resolve_url(self.base.as_ref(), href),
        });
        out.push_str(&format!("{text} [{index}]"));
    }
}

/// Text nodes and phrasing elements that belong in a running paragraph.
fn is_flow_content<N: MarkupNode>(node: &N) -> bool {
    match node.tag_name() {
        None => node.text().is_some(),
        Some(tag) => PHRASING.contains(&tag),
    }
}
