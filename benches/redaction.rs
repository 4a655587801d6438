//! Benchmarks for the detect-and-redact pipeline.
//!
//! Covers:
//! - Full pipeline per strategy on a short message
//! - Scaling with document size
//! - Detection alone, with and without domain-term preservation

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use piiscrub::{
    DetectionConfig, PiiDetector, RedactionContext, RedactionService, RedactionStrategy,
    Sensitivity,
};

const MESSAGE: &str = "Hi, I'm John (john.doe@example.com, 555-123-4567). SSN 123-45-6789, \
    card 4111 1111 1111 1111, DOB: 04/12/1987. Tracked on a Neumann U87 at 42 Abbey Road.";

const FILLER: &str = "The session ran long and the mix needed another pass on the vocals. ";

fn document(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| if i % 4 == 0 { MESSAGE } else { FILLER })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("redact_strategy");
    group.measurement_time(Duration::from_secs(5));

    let service = RedactionService::new();
    let config = DetectionConfig::new();

    for strategy in RedactionStrategy::all() {
        let context = RedactionContext::new(*strategy, Sensitivity::Medium);
        group.bench_with_input(
            BenchmarkId::new("message", strategy.as_str()),
            &context,
            |b, context| {
                b.iter(|| service.process(black_box(MESSAGE), &config, context).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("redact_scaling");

    let service = RedactionService::new();
    let config = DetectionConfig::new().with_preserve_domain_terms(true);
    let context = RedactionContext::default();

    for paragraphs in [10usize, 100, 1_000] {
        let text = document(paragraphs);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("paragraphs", paragraphs), &text, |b, text| {
            b.iter(|| service.process(black_box(text), &config, &context).unwrap());
        });
    }
    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    let detector = PiiDetector::new();
    let plain = DetectionConfig::new();
    let preserving = DetectionConfig::new().with_preserve_domain_terms(true);

    group.bench_function("all_categories", |b| {
        b.iter(|| detector.detect(black_box(MESSAGE), &plain));
    });
    group.bench_function("preserve_domain_terms", |b| {
        b.iter(|| detector.detect(black_box(MESSAGE), &preserving));
    });
    group.finish();
}

// ============================================================================
// Combined benchmark groups
// ============================================================================

criterion_group!(benches, bench_strategies, bench_scaling, bench_detection);

criterion_main!(benches);
