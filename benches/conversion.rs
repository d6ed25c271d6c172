//! Benchmarks for the document transformers.
//!
//! Run with: cargo bench

use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};

use mdx2md::transform::{ExpressionMode, MdxConfig, strip_expressions};
use mdx2md::{AssetResolver, HtmlTransformer, Index, MdxTransformer};

/// A Docusaurus-style page, repeated to a realistic length.
fn sample_mdx() -> String {
    let section = r#"import Tabs from '@theme/Tabs';
import TabItem from '@theme/TabItem';

## Installation

<Tabs groupId="pm">
<TabItem value="npm" label="npm">Run `npm install {props.pkg}` in your project.</TabItem>
<TabItem value="yarn" label="Yarn">Run `yarn add {props.pkg}` instead.</TabItem>
</Tabs>

<img src="../static/img/install.png" alt="Installer" width="400" />

![Architecture](./img/architecture.svg)

Some prose with **bold**, `code` and a [link](https://example.com).

"#;
    section.repeat(50)
}

fn sample_html() -> String {
    let section = r#"<h2>Overview</h2>
<p>The <em>quick</em> brown fox
   jumps over the <a href="dog.html">lazy dog</a>.</p>
<div class="figure"><img src="media/fox.jpg" alt="Fox"></div>
<script>track();</script>
"#;
    format!(
        "<html><head><title>Bench</title></head><body>{}</body></html>",
        section.repeat(50)
    )
}

// ============================================================================
// MDX Benchmarks
// ============================================================================

fn bench_mdx_transform(c: &mut Criterion) {
    let source = sample_mdx();
    // Images never exist, so nothing is copied and no directory is created
    let assets = std::env::temp_dir().join("mdx2md-bench-missing/images");
    let transformer = MdxTransformer::new();

    c.bench_function("mdx_transform", |b| {
        b.iter(|| {
            let mut resolver = AssetResolver::new(&assets);
            transformer.transform(&source, Path::new("/nonexistent/docs/page.mdx"), &mut resolver)
        });
    });
}

fn bench_mdx_balanced(c: &mut Criterion) {
    let source = sample_mdx();
    let assets = std::env::temp_dir().join("mdx2md-bench-missing/images");
    let transformer = MdxTransformer::with_config(MdxConfig {
        expressions: ExpressionMode::Balanced,
        ..MdxConfig::default()
    });

    c.bench_function("mdx_transform_balanced", |b| {
        b.iter(|| {
            let mut resolver = AssetResolver::new(&assets);
            transformer.transform(&source, Path::new("/nonexistent/docs/page.mdx"), &mut resolver)
        });
    });
}

fn bench_strip_expressions(c: &mut Criterion) {
    let source = sample_mdx();

    let mut group = c.benchmark_group("strip_expressions");
    group.bench_function("first_close", |b| {
        b.iter(|| strip_expressions(&source, ExpressionMode::FirstClose).len());
    });
    group.bench_function("balanced", |b| {
        b.iter(|| strip_expressions(&source, ExpressionMode::Balanced).len());
    });
    group.finish();
}

// ============================================================================
// HTML Benchmarks
// ============================================================================

fn bench_html_transform(c: &mut Criterion) {
    let source = sample_html();
    let assets = std::env::temp_dir().join("mdx2md-bench-missing/images");
    let transformer = HtmlTransformer::new();

    c.bench_function("html_transform", |b| {
        b.iter(|| {
            let mut resolver = AssetResolver::new(&assets);
            transformer.transform(&source, Path::new("/nonexistent/site/page.html"), &mut resolver)
        });
    });
}

// ============================================================================
// Index Benchmarks
// ============================================================================

fn bench_index_render(c: &mut Criterion) {
    let mut index = Index::new();
    for dir in 0..20 {
        for page in 0..25 {
            index.push(
                format!("Page {page} of section {dir}"),
                format!("section-{dir:02}/page {page}.md"),
            );
        }
    }

    c.bench_function("index_render", |b| {
        b.iter(|| index.render());
    });
}

criterion_group!(mdx_benches, bench_mdx_transform, bench_mdx_balanced, bench_strip_expressions);
criterion_group!(html_benches, bench_html_transform);
criterion_group!(index_benches, bench_index_render);

criterion_main!(mdx_benches, html_benches, index_benches);
