//! Parser throughput benchmarks
//!
//! Measures parsing of generated queries with varying:
//! - FLWOR clause counts (1, 10, 100, 1000)
//! - Direct constructor nesting depth
//! - Enabled extensions (core only vs. full-text, update and scripting)
//!
//! Run benchmarks: `cargo bench --bench parse_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use xqfront::{ParserConfig, parse_main_module};

/// A query with `count` let clauses feeding one return.
fn flwor_query(count: usize) -> String {
    let mut query = String::from("for $i in 1 to 10\n");
    for n in 0..count {
        query.push_str(&format!("let $v{} := $i * {} + local:f($i, \"s{}\")\n", n, n, n));
    }
    query.push_str("where $i mod 2 = 0\norder by $i descending\nreturn $i");
    query
}

/// Nested direct elements with an attribute and enclosed expression at each level.
fn nested_constructor(depth: usize) -> String {
    let mut query = String::new();
    for n in 0..depth {
        query.push_str(&format!("<e{} n=\"{{{}}}\" xmlns:p{}=\"urn:{}\">text ", n, n, n, n));
    }
    for n in (0..depth).rev() {
        query.push_str(&format!("</e{}>", n));
    }
    query
}

fn benchmark_flwor_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("flwor_clauses");

    for count in [1, 10, 100, 1000] {
        let query = flwor_query(count);
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("lets", count), &query, |b, query| {
            b.iter(|| {
                parse_main_module(black_box(query), ParserConfig::default())
                    .expect("benchmark query should parse")
            });
        });
    }

    group.finish();
}

fn benchmark_constructor_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("constructor_depth");

    for depth in [1, 8, 64] {
        let query = nested_constructor(depth);
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("depth", depth), &query, |b, query| {
            b.iter(|| {
                parse_main_module(black_box(query), ParserConfig::default())
                    .expect("benchmark query should parse")
            });
        });
    }

    group.finish();
}

fn benchmark_extensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("extensions");
    let query = flwor_query(100);

    for (name, config) in [
        ("core_only", ParserConfig::core_only()),
        ("all", ParserConfig::default()),
    ] {
        group.bench_with_input(BenchmarkId::new("config", name), &config, |b, config| {
            b.iter(|| {
                parse_main_module(black_box(&query), config.clone())
                    .expect("benchmark query should parse")
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_flwor_size,
    benchmark_constructor_depth,
    benchmark_extensions
);
criterion_main!(benches);
