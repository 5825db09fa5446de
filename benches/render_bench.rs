use criterion::{criterion_group, criterion_main, Criterion};

use magrender::model::{Page, PagePart, Section};
use magrender::{render_html, render_magazine, Dom, Magazine, MagazineRenderer, RenderConfig};

fn fixture() -> Magazine {
    let json = std::fs::read_to_string("tests/fixtures/magazine.json").expect("read fixture");
    serde_json::from_str(&json).expect("decode fixture")
}

/// Pages whose sections all need shrinking.
fn crowded(pages: usize) -> Magazine {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(40);
    let sections = (0..4)
        .map(|_| {
            let mut s = Section::text(text.clone());
            s.style.size = Some(30.0);
            s
        })
        .collect::<Vec<_>>();
    Magazine::new(
        (0..pages)
            .map(|_| Page {
                content: Some(PagePart {
                    sections: sections.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect(),
    )
}

fn bench_build(c: &mut Criterion) {
    let magazine = fixture();
    let renderer = MagazineRenderer::new(RenderConfig::default()).expect("config");
    c.bench_function("build_fixture", |b| {
        b.iter(|| {
            let mut dom = Dom::new("body");
            let root = dom.root();
            renderer.build(&mut dom, root, &magazine).unwrap()
        })
    });
}

fn bench_render_html(c: &mut Criterion) {
    let magazine = fixture();
    let cfg = RenderConfig::default();
    c.bench_function("render_html_fixture", |b| b.iter(|| render_html(&magazine, &cfg).unwrap()));
}

fn bench_fit_crowded(c: &mut Criterion) {
    let magazine = crowded(4);
    let cfg = RenderConfig::default();
    c.bench_function("fit_crowded_4_pages", |b| b.iter(|| render_magazine(&magazine, &cfg).unwrap()));
}

criterion_group!(benches, bench_build, bench_render_html, bench_fit_crowded);
criterion_main!(benches);
