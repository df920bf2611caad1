//! Benchmarks for exampage extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic exam documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use exampage::{ExtractOptions, PageExtractor};

/// Creates a synthetic document with `problems` problems on each page.
fn create_test_document(page_count: usize, problems: usize) -> String {
    let stops = r#"<div class="hls ps4" style="left:0mm;top:1mm;"></div>"#.repeat(4);
    let mut html = String::from("<html><body>");
    for page in 0..page_count {
        html.push_str(r#"<div class="hpa" style="width:210mm;height:297mm;"><div class="hcD" style="left:15mm;top:20mm;">"#);
        for n in 0..problems {
            html.push_str(&format!(
                r#"<div class="hls ps0" style="left:0mm;top:{}mm;width:80mm;height:5mm;"><div class="hhe">{}) </div><span class="cs1">EQ{:04} 값을 구하시오.</span></div>"#,
                n * 40,
                page * problems + n + 1,
                n
            ));
            html.push_str(r#"<div class="hls ps1" style="left:0mm;top:6mm;width:90mm;height:20mm;background-image:url(img.png)"></div>"#);
            html.push_str(&stops);
        }
        html.push_str("</div></div>");
    }
    html.push_str("</body></html>");
    html
}

/// Benchmark markup parsing alone.
fn bench_parse(c: &mut Criterion) {
    let html = create_test_document(10, 5);
    c.bench_function("parse_10_pages", |b| {
        b.iter(|| exampage::parse_html(black_box(&html)));
    });
}

/// Benchmark the full pipeline at various sizes.
fn bench_extract_pages(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_pages");

    for page_count in [1, 10, 50].iter() {
        let html = create_test_document(*page_count, 5);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            b.iter(|| PageExtractor::new(black_box(&html)).extract_pages());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            b.iter(|| {
                PageExtractor::with_options(black_box(&html), ExtractOptions::new().sequential())
                    .extract_pages()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_extract_pages);
criterion_main!(benches);
