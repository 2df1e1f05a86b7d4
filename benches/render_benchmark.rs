//! Benchmarks for docshift rendering performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic Markdown and notebook sources.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docshift::render::{flow_text, notebook_to_html, paginate_markdown, PdfWriter};
use docshift::{parse_markdown, parse_notebook, RenderOptions, RetryPolicy};

/// Creates Markdown with the given number of sections.
fn create_markdown(sections: usize) -> String {
    let mut text = String::new();
    for i in 0..sections {
        text.push_str(&format!("## Section {}\n", i + 1));
        text.push_str("Some **bold** text, some *italic* text and `inline code`.\n");
        text.push_str("- first point\n- second point with a [link](https://example.com)\n");
        text.push_str("1. step one\n2. step two\n");
    }
    text
}

/// Creates a notebook JSON document with the given number of cell pairs.
fn create_notebook(pairs: usize) -> String {
    let mut cells = Vec::new();
    for i in 0..pairs {
        cells.push(format!(
            r#"{{"cell_type":"markdown","source":["# Part {}\n","Notes with **emphasis**"]}}"#,
            i + 1
        ));
        cells.push(format!(
            r#"{{"cell_type":"code","source":["x = {}\n","print(x)"],"outputs":[{{"output_type":"stream","text":["{}\n"]}}]}}"#,
            i, i
        ));
    }
    format!(
        r#"{{"cells":[{}],"metadata":{{"language_info":{{"name":"python"}}}}}}"#,
        cells.join(",")
    )
}

/// Benchmark Markdown block parsing.
fn bench_markdown_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_parsing");

    for sections in [10, 100].iter() {
        let text = create_markdown(*sections);
        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| parse_markdown(black_box(&text)));
        });
    }

    group.finish();
}

/// Benchmark notebook parsing and HTML rendering.
fn bench_notebook_html(c: &mut Criterion) {
    let json = create_notebook(50);

    c.bench_function("notebook_to_html", |b| {
        b.iter(|| {
            let notebook = parse_notebook(black_box(&json)).unwrap();
            notebook_to_html(&notebook, "bench")
        });
    });
}

/// Benchmark paginated PDF output.
fn bench_paginated_pdf(c: &mut Criterion) {
    let doc = parse_markdown(&create_markdown(50));
    let options = RenderOptions::new().with_title("bench");
    let mut paginate = options.paginate.clone();
    paginate.retry = RetryPolicy::immediate(1_000);
    let options = options.with_paginate(paginate);

    c.bench_function("markdown_to_pdf", |b| {
        b.iter(|| {
            let paged = paginate_markdown(black_box(&doc), &options).unwrap();
            PdfWriter::new().write(&paged).unwrap()
        });
    });

    let text = "A line of plain text for the flow layout.\n".repeat(500);
    c.bench_function("plain_text_to_pdf", |b| {
        b.iter(|| PdfWriter::new().write(&flow_text(black_box(&text), &options)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_markdown_parsing,
    bench_notebook_html,
    bench_paginated_pdf,
);
criterion_main!(benches);
