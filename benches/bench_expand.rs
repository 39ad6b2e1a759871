#![allow(
    clippy::tests_outside_test_module,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    reason = "benchmark"
)]

use std::hint::black_box;

use cartesian::expand;
use criterion::{Criterion, criterion_group, criterion_main};

#[path = "../tests/fixtures.rs"]
mod fixtures;
mod utils;

fn expand_benchmark(c: &mut Criterion) {
    let matrix = fixtures::build_matrix();
    let wide = utils::generate_random_template(8);

    let mut group = c.benchmark_group("Expansion");
    group.sample_size(50);

    group.bench_function("build_matrix", |b| {
        b.iter(|| black_box(expand(&matrix).unwrap()));
    });

    group.bench_function("wide_object", |b| {
        b.iter(|| black_box(expand(&wide).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, expand_benchmark);
criterion_main!(benches);
