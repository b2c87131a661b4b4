//! Benchmarks for the conversion pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use cidian::lexicon::MemoryLexicon;
use cidian::markup::parse_markup;
use cidian::section::{SectionLayout, build_section, split_sections};
use cidian::transpile::Transpiler;
use cidian::zhuyin::{Zhuyin, pinyin_to_zhuyin};
use cidian::{ConvertConfig, Converter, RawEntry, split_entries};

const SAMPLE: &str = include_str!("../tests/fixtures/guifan_sample.txt");

/// A long entry: many senses, each with examples, links and an erhua form.
fn synthetic_entry(senses: usize) -> String {
    let mut markup = String::from(r#"<div class="HYGF2">"#);
    for i in 0..senses {
        if i > 0 {
            markup.push_str("\n<hr>\n");
        }
        markup.push_str(&format!(
            r#"<x-hw>点</x-hw>（點）<x-pr>diǎn</x-pr><dt>名</dt><x-dfn>第{i}义。<x-eg><a href="entry://一点儿">一点儿</a>水。</x-eg></x-dfn><x-hwp>点儿</x-hwp> <x-pr>diǎnr</x-pr>"#
        ));
    }
    markup.push_str("</div>");
    markup
}

fn bench_split_entries(c: &mut Criterion) {
    let dump = SAMPLE.repeat(500);
    c.bench_function("split_entries", |b| {
        b.iter(|| split_entries(black_box(&dump)).unwrap());
    });
}

fn bench_transpile_entry(c: &mut Criterion) {
    let markup = synthetic_entry(20);
    let layout = SectionLayout::default();
    c.bench_function("transpile_entry", |b| {
        b.iter(|| {
            let dom = parse_markup(black_box(&markup));
            let mut transpiler = Transpiler::new(Arc::new(Zhuyin));
            split_sections(&dom, &layout)
                .into_iter()
                .map(|nodes| build_section(&dom, nodes, &mut transpiler).unwrap())
                .count()
        });
    });
}

fn bench_zhuyin(c: &mut Criterion) {
    c.bench_function("pinyin_to_zhuyin", |b| {
        b.iter(|| pinyin_to_zhuyin(black_box("zhōnghuá rénmín gònghéguó yīdiǎnr")));
    });
}

fn bench_convert(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let entries: Vec<RawEntry> = (0..200)
        .map(|i| RawEntry::new(format!("点{i}"), synthetic_entry(3)))
        .collect();
    let converter = Converter::new(ConvertConfig::default());

    c.bench_function("convert_200_entries", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let (mut pinyin, mut zhuyin) = (MemoryLexicon::new(), MemoryLexicon::new());
                converter
                    .convert(&entries, &mut pinyin, &mut zhuyin)
                    .await
                    .unwrap()
            })
        });
    });
}

criterion_group!(
    benches,
    bench_split_entries,
    bench_transpile_entry,
    bench_zhuyin,
    bench_convert
);
criterion_main!(benches);
