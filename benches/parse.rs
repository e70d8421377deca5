use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nosj::{parse, ser::to_canonical_string, to_string};
use serde::Serialize;

#[derive(Serialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
    scores: Vec<f64>,
}

fn users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| User {
            id: i as u32,
            name: format!("User {i}"),
            email: format!("user{i}@example.com"),
            active: i % 2 == 0,
            scores: vec![i as f64 * 0.5, 1e-3, 12.25],
        })
        .collect()
}

fn document(count: usize) -> String {
    to_string(&users(count)).unwrap_or_default()
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [10, 100, 1000] {
        let input = document(count);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| parse(black_box(input.as_bytes())))
        });
    }
    group.finish();
}

fn benchmark_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");
    for count in [10, 100, 1000] {
        let value = match parse(document(count).as_bytes()) {
            Ok(value) => value,
            Err(_) => continue,
        };
        group.bench_with_input(BenchmarkId::from_parameter(count), &value, |b, value| {
            b.iter(|| to_canonical_string(black_box(value)))
        });
    }
    group.finish();
}

fn benchmark_deep_nesting(c: &mut Criterion) {
    let input = format!("{}{}", "[".repeat(1000), "]".repeat(1000));
    c.bench_function("parse_nested_1000", |b| {
        b.iter(|| parse(black_box(input.as_bytes())))
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_canonical,
    benchmark_deep_nesting
);
criterion_main!(benches);
