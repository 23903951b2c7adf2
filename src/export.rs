//! Markdown export of an extracted document.

use std::fmt::Write;

use crate::document::{ContentBlock, Document};

/// Serialize a document as markdown, block for block.
///
/// Links become a trailing list of `[N]: url (text)` definitions so the
/// inline `[N]` markers keep resolving.
pub fn to_markdown(document: &Document) -> String {
    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", document.title());

    let byline: Vec<String> = [
        (!document.author().is_empty()).then(|| format!("by {}", document.author())),
        (!document.site_name().is_empty()).then(|| document.site_name().to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !byline.is_empty() {
        let _ = write!(out, "*{}*\n\n", byline.join(" · "));
    }
    out.push_str("---\n\n");

    for block in document.blocks() {
        write_block(&mut out, block);
    }

    if !document.links().is_empty() {
        out.push_str("---\n\n## Links\n\n");
        for link in document.links() {
            let _ = writeln!(out, "[{}]: {} ({})", link.index, link.url, link.text);
        }
    }
    out
}

fn write_block(out: &mut String, block: &ContentBlock) {
    match block {
        ContentBlock::Heading { level, text } => {
            let _ = write!(out, "{} {text}\n\n", "#".repeat(usize::from(*level)));
        }
        ContentBlock::Paragraph(text) => {
            let _ = write!(out, "{text}\n\n");
        }
        ContentBlock::Code { text, language } => {
            let _ = write!(
                out,
                "```{}\n{text}\n```\n\n",
                language.as_deref().unwrap_or("")
            );
        }
        ContentBlock::List { ordered, items } => {
            for (idx, item) in items.iter().enumerate() {
                if *ordered {
                    let _ = writeln!(out, "{}. {item}", idx + 1);
                } else {
                    let _ = writeln!(out, "- {item}");
                }
            }
            out.push('\n');
        }
        ContentBlock::Quote(text) => {
            for line in text.lines() {
                let _ = writeln!(out, "> {line}");
            }
            out.push('\n');
        }
        ContentBlock::Image { alt, url } => {
            let alt = if alt.is_empty() { "image" } else { alt };
            let _ = write!(out, "![{alt}]({url})\n\n");
        }
        ContentBlock::Table { rows, .. } => write_table(out, rows),
        ContentBlock::HorizontalRule => out.push_str("---\n\n"),
    }
}

/// The first row always becomes the markdown header row.
fn write_table(out: &mut String, rows: &[Vec<String>]) {
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return;
    }
    let write_row = |out: &mut String, row: &[String]| {
        out.push('|');
        for idx in 0..num_cols {
            let cell = row.get(idx).map_or("", String::as_str);
            let _ = write!(out, " {} |", cell.replace('|', "\\|"));
        }
        out.push('\n');
    };

    write_row(out, &rows[0]);
    out.push('|');
    out.push_str(&" --- |".repeat(num_cols));
    out.push('\n');
    for row in &rows[1..] {
        write_row(out, row);
    }
    out.push('\n');
}
