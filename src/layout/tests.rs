use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use super::*;
use crate::highlight::HighlightError;
use crate::image::RasterError;

type CallLog = Rc<RefCell<Vec<String>>>;

struct FakeRasterizer {
    calls: CallLog,
    inline: Result<String, RasterError>,
    ascii: Result<Vec<Vec<InlineSpan>>, RasterError>,
}

impl ImageRasterizer for FakeRasterizer {
    fn inline(&self, url: &str, _width: usize) -> Result<String, RasterError> {
        self.calls.borrow_mut().push(format!("inline {url}"));
        self.inline.clone()
    }

    fn ascii(&self, url: &str, _width: usize) -> Result<Vec<Vec<InlineSpan>>, RasterError> {
        self.calls.borrow_mut().push(format!("ascii {url}"));
        self.ascii.clone()
    }
}

struct FakeHighlighter;

impl CodeHighlighter for FakeHighlighter {
    fn highlight(
        &self,
        code: &str,
        _language: Option<&str>,
    ) -> Result<Vec<Vec<InlineSpan>>, HighlightError> {
        Ok(code
            .lines()
            .map(|line| vec![InlineSpan::styled(line, InlineStyle::fg(1))])
            .collect())
    }
}

fn engine_with_images(
    inline_supported: bool,
    inline: Result<String, RasterError>,
    ascii: Result<Vec<Vec<InlineSpan>>, RasterError>,
) -> (LayoutEngine, CallLog) {
    let calls = CallLog::default();
    let engine = LayoutEngine::new(
        Box::new(PlainHighlighter),
        Box::new(FakeRasterizer {
            calls: Rc::clone(&calls),
            inline,
            ascii,
        }),
        Box::new(FixedCapabilities(inline_supported)),
    );
    (engine, calls)
}

fn heading(level: u8, text: &str) -> ContentBlock {
    ContentBlock::Heading {
        level,
        text: text.to_string(),
    }
}

fn paragraph(text: &str) -> ContentBlock {
    ContentBlock::Paragraph(text.to_string())
}

fn image(alt: &str, url: &str) -> ContentBlock {
    ContentBlock::Image {
        alt: alt.to_string(),
        url: url.to_string(),
    }
}

fn contents(layout: &Layout) -> Vec<&str> {
    layout.lines().iter().map(RenderedLine::content).collect()
}

fn find_line(layout: &Layout, needle: &str) -> Option<usize> {
    layout
        .lines()
        .iter()
        .position(|line| line.content().contains(needle))
}

#[test]
fn test_title_box_with_byline_and_reading_time() {
    let doc = Document::new("My Article", vec![paragraph("one two three")], Vec::new())
        .with_author("Ada")
        .with_site_name("Example");
    let layout = LayoutEngine::default().render(&doc, 60);
    let lines = contents(&layout);

    assert!(lines[0].starts_with('╭') && lines[0].ends_with('╮'));
    assert_eq!(display_width(lines[0]), 60);
    assert!(lines.iter().any(|l| l.contains("My Article")));
    assert!(lines.iter().any(|l| l.contains("by Ada · Example")));
    assert!(lines.iter().any(|l| l.contains("1 min read · 3 words")));
    assert!(
        lines
            .iter()
            .take_while(|l| !l.starts_with('╰'))
            .all(|l| display_width(l) == 60)
    );
}

#[test]
fn test_byline_separator_only_with_both_parts() {
    let author_only = Document::new("T", Vec::new(), Vec::new()).with_author("Ada");
    let layout = LayoutEngine::default().render(&author_only, 60);
    assert!(find_line(&layout, "by Ada").is_some());
    assert!(find_line(&layout, "by Ada ·").is_none());

    let site_only = Document::new("T", Vec::new(), Vec::new()).with_site_name("Example");
    let layout = LayoutEngine::default().render(&site_only, 60);
    assert!(find_line(&layout, "Example").is_some());
    assert!(find_line(&layout, "by ").is_none());

    let neither = Document::new("T", Vec::new(), Vec::new());
    let layout = LayoutEngine::default().render(&neither, 60);
    // top border, padding, title, read line, padding, bottom border, blank
    assert_eq!(layout.line_count(), 7);
}

#[test]
fn test_reading_minutes() {
    assert_eq!(reading_minutes(0), 1);
    assert_eq!(reading_minutes(238), 1);
    assert_eq!(reading_minutes(239), 2);
    assert_eq!(reading_minutes(2380), 10);
}

#[test]
fn test_word_count_uses_thousands_separator() {
    let text = vec!["word"; 1500].join(" ");
    let doc = Document::new("T", vec![paragraph(&text)], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 80);
    assert!(find_line(&layout, "7 min read · 1,500 words").is_some());
}

#[test]
fn test_width_is_clamped() {
    let doc = Document::new("T", vec![paragraph("hello")], Vec::new());
    let engine = LayoutEngine::default();
    assert_eq!(engine.render(&doc, 200).width(), MAX_WIDTH);
    assert_eq!(engine.render(&doc, 5).width(), MIN_WIDTH);
    assert_eq!(engine.render(&doc, 50).width(), 50);
}

#[test]
fn test_heading_offsets_point_at_divider_or_heading() {
    let doc = Document::new(
        "T",
        vec![
            heading(1, "Intro"),
            paragraph("text"),
            heading(2, "Details"),
            paragraph("more"),
        ],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    let offsets = layout.heading_offsets();
    assert_eq!(offsets.len(), 2);

    let first = &layout.lines()[offsets[0]];
    assert_eq!(first.line_type(), LineType::Heading(1));
    assert_eq!(first.content(), "▸ Intro");

    let second = &layout.lines()[offsets[1]];
    assert_eq!(second.line_type(), LineType::Divider);
    assert_eq!(
        layout.lines()[offsets[1] + 2].content(),
        "▸ Details"
    );
}

#[test]
fn test_no_divider_before_leading_heading() {
    let doc = Document::new("T", vec![heading(1, "Start")], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 60);
    assert!(
        layout
            .lines()
            .iter()
            .all(|line| line.line_type() != LineType::Divider)
    );
}

#[test]
fn test_deep_headings_are_indented() {
    let doc = Document::new(
        "T",
        vec![heading(3, "Three"), heading(4, "Four"), heading(6, "Six")],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    assert!(find_line(&layout, "  ▹ Three").is_some());
    assert!(find_line(&layout, "    ▹ Four").is_some());
    assert!(find_line(&layout, "        ▹ Six").is_some());
}

#[test]
fn test_mixed_blocks_fit_width_40() {
    let long = "lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(6);
    let doc = Document::new(
        "A fairly long title that needs to wrap inside the box",
        vec![
            heading(1, "First"),
            paragraph(&long),
            heading(2, "Second"),
            ContentBlock::List {
                ordered: true,
                items: vec![long.clone(), "short".into()],
            },
            heading(3, "Third"),
            ContentBlock::Quote(long.clone()),
            ContentBlock::Code {
                text: format!("let x = \"{long}\";"),
                language: Some("rust".into()),
            },
            ContentBlock::HorizontalRule,
        ],
        vec![Link {
            index: 1,
            text: "a link".into(),
            url: format!("https://example.com/{}", "segment/".repeat(10)),
        }],
    );
    let layout = LayoutEngine::default().render(&doc, 40);
    assert_eq!(layout.heading_offsets().len(), 3);
    for line in layout.lines() {
        assert!(
            display_width(line.content()) <= 40,
            "line too wide: {:?}",
            line.content()
        );
    }
}

#[test]
fn test_ragged_table_cell_is_padded() {
    let doc = Document::new(
        "T",
        vec![ContentBlock::Table {
            rows: vec![vec!["a".into(), "b".into()], vec!["c".into()]],
            header: false,
        }],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    assert!(find_line(&layout, "  │ c │   │").is_some());
}

#[test]
fn test_paragraph_footnote_markers_are_styled() {
    let doc = Document::new("T", vec![paragraph("Hello world [1] and [note]")], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 60);
    let idx = find_line(&layout, "Hello world").unwrap();
    let line = &layout.lines()[idx];
    assert_eq!(line.content(), " Hello world [1] and [note]");
    let marker = line.spans().iter().find(|s| s.text() == "[1]").unwrap();
    assert_eq!(marker.style(), palette::footnote());
    let note = line.spans().iter().find(|s| s.text() == "[note]").unwrap();
    assert_eq!(note.style(), InlineStyle::default());
}

#[test]
fn test_list_markers() {
    let doc = Document::new(
        "T",
        vec![
            ContentBlock::List {
                ordered: false,
                items: vec!["apple".into()],
            },
            ContentBlock::List {
                ordered: true,
                items: vec!["first".into(), "second".into()],
            },
        ],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    assert!(find_line(&layout, "  • apple").is_some());
    assert!(find_line(&layout, "  1. first").is_some());
    assert!(find_line(&layout, "  2. second").is_some());
}

#[test]
fn test_quote_has_bar_and_italic_text() {
    let doc = Document::new("T", vec![ContentBlock::Quote("wise words".into())], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 60);
    let idx = find_line(&layout, "┃ wise words").unwrap();
    let line = &layout.lines()[idx];
    assert_eq!(line.line_type(), LineType::Quote);
    assert!(line.spans().last().unwrap().style().italic);
}

#[test]
fn test_code_block_box_with_label() {
    let doc = Document::new(
        "T",
        vec![ContentBlock::Code {
            text: "fn main() {}".into(),
            language: Some("rust".into()),
        }],
        Vec::new(),
    );
    let layout = LayoutEngine::new(
        Box::new(FakeHighlighter),
        Box::new(NoImages),
        Box::new(FixedCapabilities(false)),
    )
    .render(&doc, 40);

    let top = find_line(&layout, "╭─ rust ").unwrap();
    let body = &layout.lines()[top + 1];
    let bottom = &layout.lines()[top + 2];
    assert_eq!(display_width(layout.lines()[top].content()), 38);
    assert!(body.content().starts_with("  │ fn main() {}"));
    assert!(body.content().ends_with(" │"));
    assert_eq!(display_width(body.content()), 38);
    assert!(bottom.content().starts_with("  ╰"));
    assert!(
        body.spans()
            .iter()
            .any(|s| s.text() == "fn main() {}" && s.style() == InlineStyle::fg(1))
    );
}

#[test]
fn test_code_highlighter_failure_falls_back_to_plain() {
    let doc = Document::new(
        "T",
        vec![ContentBlock::Code {
            text: "a\tb\n  indented".into(),
            language: Some("unknown-lang".into()),
        }],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    let idx = find_line(&layout, "a    b").unwrap();
    let line = &layout.lines()[idx];
    assert!(line.spans().iter().any(|s| s.style() == InlineStyle::fg(CODE)));
    assert!(find_line(&layout, "│   indented").is_some());
}

#[test]
fn test_code_lines_are_truncated_to_box() {
    let doc = Document::new(
        "T",
        vec![ContentBlock::Code {
            text: "x".repeat(200),
            language: None,
        }],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 30);
    let idx = find_line(&layout, "xxxx").unwrap();
    assert_eq!(display_width(layout.lines()[idx].content()), 28);
}

#[test]
fn test_images_are_deferred_to_trailing_section() {
    let doc = Document::new(
        "T",
        vec![image("a cat", ""), paragraph("body text")],
        Vec::new(),
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    let body = find_line(&layout, "body text").unwrap();
    let header = find_line(&layout, "  Images").unwrap();
    let placeholder = find_line(&layout, "[IMAGE: a cat]").unwrap();
    assert!(body < header && header < placeholder);
}

#[test]
fn test_image_inline_when_supported() {
    let (engine, calls) = engine_with_images(
        true,
        Ok("\x1b]1337;File=inline=1:AAAA\x07".into()),
        Ok(vec![vec![InlineSpan::plain("ascii")]]),
    );
    let doc = Document::new("T", vec![image("photo", "https://a.com/p.png")], Vec::new());
    let layout = engine.render(&doc, 60);

    assert_eq!(*calls.borrow(), vec!["inline https://a.com/p.png"]);
    let raster = layout
        .lines()
        .iter()
        .find(|line| line.passthrough_escape().is_some())
        .unwrap();
    assert!(raster.passthrough_escape().unwrap().starts_with("  \x1b]1337"));
    assert!(find_line(&layout, "  photo").is_some());
    assert!(find_line(&layout, "[IMAGE").is_none());
}

#[test]
fn test_image_ascii_when_inline_unsupported() {
    let (engine, calls) = engine_with_images(
        false,
        Ok("escape".into()),
        Ok(vec![vec![InlineSpan::plain("@@@@")]]),
    );
    let doc = Document::new("T", vec![image("photo", "https://a.com/p.png")], Vec::new());
    let layout = engine.render(&doc, 60);

    assert_eq!(*calls.borrow(), vec!["ascii https://a.com/p.png"]);
    assert!(find_line(&layout, "  @@@@").is_some());
    assert!(find_line(&layout, "  photo").is_some());
}

#[test]
fn test_image_ascii_after_inline_failure() {
    let (engine, calls) = engine_with_images(
        true,
        Err(RasterError::Fetch("HTTP 500".into())),
        Ok(vec![vec![InlineSpan::plain("####")]]),
    );
    let doc = Document::new("T", vec![image("", "https://a.com/p.png")], Vec::new());
    let layout = engine.render(&doc, 60);

    assert_eq!(calls.borrow().len(), 2);
    assert!(find_line(&layout, "  ####").is_some());
    assert!(layout.lines().iter().all(|l| l.passthrough_escape().is_none()));
}

#[test]
fn test_image_placeholder_when_all_fail() {
    let (engine, _calls) = engine_with_images(
        true,
        Err(RasterError::TooLarge),
        Err(RasterError::Decode("bad".into())),
    );
    let doc = Document::new(
        "T",
        vec![image("", "https://a.com/p.png"), image("diagram", "https://a.com/d.png")],
        Vec::new(),
    );
    let layout = engine.render(&doc, 60);
    assert!(find_line(&layout, "  [IMAGE: image]").is_some());
    assert!(find_line(&layout, "  [IMAGE: diagram]").is_some());
}

#[test]
fn test_image_without_url_skips_rasterizer() {
    let (engine, calls) = engine_with_images(true, Ok("x".into()), Ok(Vec::new()));
    let doc = Document::new("T", vec![image("logo", "")], Vec::new());
    let layout = engine.render(&doc, 60);
    assert!(calls.borrow().is_empty());
    assert!(find_line(&layout, "[IMAGE: logo]").is_some());
}

#[test]
fn test_links_section() {
    let doc = Document::new(
        "Title",
        vec![paragraph("Hello world [1]")],
        vec![Link {
            index: 1,
            text: "world".into(),
            url: "https://a.com/x".into(),
        }],
    );
    let layout = LayoutEngine::default().render(&doc, 60);
    let header = find_line(&layout, "  Links").unwrap();
    let entry = find_line(&layout, "  [1] world").unwrap();
    assert!(header < entry);
    let url_line = &layout.lines()[entry + 1];
    assert_eq!(url_line.content(), "      https://a.com/x");
    assert_eq!(url_line.hyperlink(), Some("https://a.com/x"));

    let ansi = layout.to_ansi(true);
    assert!(ansi.contains("\x1b]8;;https://a.com/x\x1b\\"));
    assert!(!layout.to_ansi(false).contains("\x1b]8;;"));
}

#[test]
fn test_no_links_section_without_links() {
    let doc = Document::new("T", vec![paragraph("plain")], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 60);
    assert!(find_line(&layout, "  Links").is_none());
}

#[test]
fn test_to_plain_has_no_escapes() {
    let doc = Document::new("T", vec![heading(1, "Head"), paragraph("p [1]")], Vec::new());
    let layout = LayoutEngine::default().render(&doc, 60);
    let plain = layout.to_plain();
    assert!(!plain.contains('\x1b'));
    assert_eq!(plain.lines().count(), layout.line_count());
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9]{1,30}|\\[[0-9]{1,2}\\]|日本語", 0..40)
        .prop_map(|words| words.join(" "))
}

fn arb_block() -> impl Strategy<Value = ContentBlock> {
    prop_oneof![
        (1u8..=6, arb_text()).prop_map(|(level, text)| ContentBlock::Heading { level, text }),
        arb_text().prop_map(ContentBlock::Paragraph),
        arb_text().prop_map(ContentBlock::Quote),
        (any::<bool>(), prop::collection::vec(arb_text(), 1..4))
            .prop_map(|(ordered, items)| ContentBlock::List { ordered, items }),
        arb_text().prop_map(|text| ContentBlock::Code {
            text,
            language: None
        }),
        Just(ContentBlock::HorizontalRule),
        (
            prop::collection::vec(prop::collection::vec("[a-zA-Z0-9 ]{0,60}", 0..5), 1..4),
            any::<bool>(),
        )
            .prop_map(|(rows, header)| ContentBlock::Table { rows, header }),
    ]
}

fn arb_document() -> impl Strategy<Value = Document> {
    (arb_text(), prop::collection::vec(arb_block(), 0..12))
        .prop_map(|(title, blocks)| Document::new(title, blocks, Vec::new()))
}

proptest! {
    #[test]
    fn prop_wrapped_text_fits_width(doc in arb_document(), width in 0usize..140) {
        let layout = LayoutEngine::default().render(&doc, width);
        let limit = clamp_width(width);
        for line in layout.lines() {
            if matches!(
                line.line_type(),
                LineType::Paragraph | LineType::ListItem | LineType::Quote
            ) {
                prop_assert!(
                    display_width(line.content()) < limit,
                    "{:?} wider than {}", line.content(), limit - 1
                );
            }
            prop_assert!(display_width(line.content()) <= limit);
        }
    }

    #[test]
    fn prop_render_is_deterministic(doc in arb_document(), width in 20usize..120) {
        let engine = LayoutEngine::default();
        prop_assert_eq!(engine.render(&doc, width), engine.render(&doc, width));
    }

    #[test]
    fn prop_one_offset_per_heading(doc in arb_document(), width in 20usize..120) {
        let layout = LayoutEngine::default().render(&doc, width);
        prop_assert_eq!(layout.heading_offsets().len(), doc.headings().count());
        prop_assert!(layout.heading_offsets().windows(2).all(|w| w[0] < w[1]));
    }
}
