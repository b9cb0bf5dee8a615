//! Per-field latency benchmarks
//!
//! Run with: cargo bench -p fieldrules-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::PathBuf;

use fieldrules_engine::{FileRuleSource, RuleEngine};

fn sample_engine() -> RuleEngine {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/rules.json");
    RuleEngine::new(FileRuleSource::new(path))
}

fn benchmark_apply_rules(c: &mut Criterion) {
    let engine = sample_engine();

    let cases = [
        ("name_masked", "name", "Michael Chen"),
        ("name_transformed", "name", "John Doe"),
        ("age_category", "age", "37"),
        ("phone_format", "phone", "5551234567"),
        ("birth_date", "birthDate", "2000-01-15"),
        ("comments_replace", "comments", "This contains badword1 and badword2"),
        ("ssn_partial_mask", "ssn", "123-45-6789"),
        ("no_rules", "nickname", "Ace"),
    ];

    let mut group = c.benchmark_group("apply_rules");
    group.sample_size(200);

    for (name, field, value) in cases {
        group.bench_with_input(BenchmarkId::new(field, name), &value, |b, value| {
            b.iter(|| engine.apply_rules(black_box(field), black_box(*value)));
        });
    }

    group.finish();
}

fn benchmark_reload(c: &mut Criterion) {
    let engine = sample_engine();

    c.bench_function("reload_rules", |b| {
        b.iter(|| engine.reload_rules().map(|summary| summary.current))
    });
}

criterion_group!(benches, benchmark_apply_rules, benchmark_reload);
criterion_main!(benches);
