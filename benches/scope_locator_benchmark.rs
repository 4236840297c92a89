//! Benchmark suite for cursor scope resolution and region classification
//!
//! This benchmark measures:
//! - Scope lookup with many sibling facts between cursor and parent
//! - Scope lookup in deeply nested queries
//! - Region classification of large documents

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lingo_language_server::lingo::{
    DocumentSnapshot, HeaderRegionClassifier, RegionClassifier, ScopeOptions, locate_scope,
};

/// A query whose root fact has `siblings` deeper children before the cursor.
fn generate_wide_query(siblings: usize) -> Vec<String> {
    let mut lines = vec!["lexicons:".to_string(), "  - codelingo/go as go".to_string()];
    lines.push("go.file:".to_string());
    for i in 0..siblings {
        lines.push(format!("  go.func{}:", i));
        lines.push("    go.name: main".to_string());
        lines.push("    go.block:".to_string());
        lines.push("      go.stmt: x".to_string());
    }
    lines.push("  ".to_string());
    lines
}

/// A query nested `depth` levels deep with the cursor at the bottom.
fn generate_deep_query(depth: usize) -> Vec<String> {
    let mut lines = vec!["match:".to_string()];
    for level in 0..depth {
        lines.push(format!("{}go.level{}:", "  ".repeat(level + 1), level));
    }
    lines.push("  ".repeat(depth + 1));
    lines
}

fn generate_tenets_document(tenets: usize) -> String {
    let mut text = String::from("lexicons:\n  - codelingo/go as go\ntenets:\n");
    for i in 0..tenets {
        text.push_str(&format!("  - name: tenet-{}\n    match:\n      go.func:\n        go.name: f{}\n", i, i));
    }
    text
}

fn bench_wide_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_wide");

    for siblings in [10, 100, 250] {
        let lines = generate_wide_query(siblings);
        let cursor = lines.len() - 1;

        group.throughput(Throughput::Elements(cursor as u64));
        group.bench_with_input(BenchmarkId::new("locate_scope", siblings), &lines, |b, lines| {
            b.iter(|| locate_scope(lines, black_box(cursor), ScopeOptions::default()));
        });
    }

    group.finish();
}

fn bench_deep_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_deep");

    for depth in [5, 20, 50] {
        let lines = generate_deep_query(depth);
        let cursor = lines.len() - 1;

        group.bench_with_input(BenchmarkId::new("locate_scope", depth), &lines, |b, lines| {
            b.iter(|| locate_scope(lines, black_box(cursor), ScopeOptions::default()));
        });
    }

    group.finish();
}

fn bench_region_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_classification");
    let classifier = HeaderRegionClassifier::new(4);

    for tenets in [10, 100, 1000] {
        let snapshot = DocumentSnapshot::from_text(&generate_tenets_document(tenets));

        group.throughput(Throughput::Elements(snapshot.line_count() as u64));
        group.bench_with_input(BenchmarkId::new("classify", tenets), &snapshot, |b, snapshot| {
            b.iter(|| classifier.classify(black_box(snapshot)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_wide_scope,
    bench_deep_scope,
    bench_region_classification,
);

criterion_main!(benches);
