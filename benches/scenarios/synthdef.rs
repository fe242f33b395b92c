//! Benchmarks for building and encoding definitions.
//!
//! Runs once at startup, but a slow encoder delays the first note.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_organ::voices::{organ_master, organ_voice};

use crate::PARTIAL_COUNTS;

pub fn bench_synthdef(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synthdef");

    for &partials in PARTIAL_COUNTS {
        group.bench_with_input(BenchmarkId::new("build_voice", partials), &partials, |b, &n| {
            b.iter(|| organ_voice(black_box(n)))
        });

        let def = organ_voice(partials);
        group.bench_with_input(BenchmarkId::new("encode_voice", partials), &partials, |b, _| {
            b.iter(|| black_box(&def).to_bytes())
        });
    }

    group.bench_function("master", |b| b.iter(|| organ_master().to_bytes()));

    group.finish();
}
