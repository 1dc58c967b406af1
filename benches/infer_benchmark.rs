//! Benchmarks for outline inference.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic runs, so the numbers cover inference only and not
//! PDF decoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdfoutline::{BBox, InferenceConfig, OutlineEngine, TextRun};

const BODY: &str = "Benchmark paragraph text standing in for the body of a typical report page.";

/// Creates runs for a document with a title page and one heading plus
/// forty body lines per page.
fn create_test_runs(page_count: u32) -> Vec<TextRun> {
    let mut runs = vec![TextRun::new(
        "Benchmark Report",
        "Helvetica-Bold",
        24.0,
        true,
        BBox::new(72.0, 72.0, 300.0, 96.0),
        1,
    )];

    for page in 1..=page_count {
        runs.push(TextRun::new(
            format!("{}. Section {}", page, page),
            "Helvetica-Bold",
            16.0,
            true,
            BBox::new(72.0, 120.0, 220.0, 136.0),
            page,
        ));
        for line in 0..40 {
            let y = 150.0 + line as f32 * 14.0;
            runs.push(TextRun::new(
                BODY,
                "Helvetica",
                11.0,
                false,
                BBox::new(72.0, y, 540.0, y + 11.0),
                page,
            ));
        }
        runs.push(TextRun::new(
            format!("Page {}", page),
            "Helvetica",
            9.0,
            false,
            BBox::new(290.0, 760.0, 320.0, 769.0),
            page,
        ));
    }

    runs
}

/// Benchmark inference at various document sizes.
fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");

    for page_count in [1, 10, 50].iter() {
        let runs = create_test_runs(*page_count);
        let parallel = OutlineEngine::new(InferenceConfig::default());
        let sequential = OutlineEngine::new(InferenceConfig::default().sequential());

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            b.iter(|| parallel.infer(black_box(&runs)).unwrap());
        });
        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            b.iter(|| sequential.infer(black_box(&runs)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark line aggregation on one dense page.
fn bench_line_aggregation(c: &mut Criterion) {
    let runs = create_test_runs(1);
    let config = InferenceConfig::default();

    c.bench_function("aggregate_lines", |b| {
        b.iter(|| pdfoutline::infer::aggregate_lines(black_box(&runs), &config));
    });
}

criterion_group!(benches, bench_inference, bench_line_aggregation);
criterion_main!(benches);
