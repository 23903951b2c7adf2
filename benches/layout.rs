//! Benchmarks for document layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use getwebsite::document::{ContentBlock, Document};
use getwebsite::layout::LayoutEngine;

fn document() -> Document {
    let mut blocks = Vec::new();
    for i in 0..100 {
        blocks.push(ContentBlock::Heading {
            level: 2,
            text: format!("Section {i}"),
        });
        blocks.push(ContentBlock::Paragraph(
            "lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(8),
        ));
        blocks.push(ContentBlock::Code {
            text: "fn main() {\n    println!(\"hi\");\n}".into(),
            language: Some("rust".into()),
        });
    }
    Document::new("Bench", blocks, Vec::new())
}

fn bench_render(c: &mut Criterion) {
    let doc = document();
    let engine = LayoutEngine::default();
    c.bench_function("layout_render", |b| {
        b.iter(|| engine.render(black_box(&doc), black_box(80)))
    });
}

fn bench_to_ansi(c: &mut Criterion) {
    let layout = LayoutEngine::default().render(&document(), 80);
    c.bench_function("layout_to_ansi", |b| b.iter(|| black_box(&layout).to_ansi(true)));
}

criterion_group!(benches, bench_render, bench_to_ansi);
criterion_main!(benches);
