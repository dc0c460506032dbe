//! Model table query benchmarks
//!
//! Benchmarks for the table query engine including:
//! - Filter + search over growing registries
//! - Sorting by top-level and metadata fields
//! - Pinning scheme associations

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use model_manager::models::query::{FilterSpec, SortDirection, SortSpec, pin_associated, query};
use model_manager::models::{Model, ModelStatus, ModelType};
use model_manager::seed;
use std::hint::black_box;

/// Build a registry of `count` rows by cycling the demo models
fn populated_models(count: usize) -> Vec<Model> {
    let base = seed::mock_models();
    (0..count)
        .map(|i| {
            let mut model = base[i % base.len()].clone();
            model.id = format!("model-{}", i);
            model.name = format!("{}-{}", model.name, i);
            model.metadata.accuracy = (i % 1000) as f64 / 1000.0;
            model
        })
        .collect()
}

fn bench_filter_and_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_filter_search");
    let filter = FilterSpec {
        model_type: Some(ModelType::Detection),
        status: Some(ModelStatus::Active),
        tags: vec!["upper-3".to_string(), "upper-1".to_string()],
    };

    for count in [100, 1000] {
        let models = populated_models(count);
        group.bench_with_input(BenchmarkId::new("rows", count), &models, |b, models| {
            b.iter(|| query(black_box(models), &filter, None, black_box("yolo")));
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_sort");

    for (field, direction) in [
        ("name", SortDirection::Asc),
        ("accuracy", SortDirection::Desc),
        ("timestamp", SortDirection::Asc),
    ] {
        let sort = SortSpec::new(field, direction);
        for count in [100, 1000] {
            let models = populated_models(count);
            group.bench_with_input(
                BenchmarkId::new(field, count),
                &models,
                |b, models| {
                    b.iter(|| query(black_box(models), &FilterSpec::default(), Some(&sort), ""));
                },
            );
        }
    }
    group.finish();
}

fn bench_pin_associated(c: &mut Criterion) {
    let associations = seed::mock_associations();
    let models = populated_models(1000);

    c.bench_function("pin_associated_1000", |b| {
        b.iter(|| pin_associated(black_box(models.clone()), &associations));
    });
}

criterion_group!(
    benches,
    bench_filter_and_search,
    bench_sort,
    bench_pin_associated
);
criterion_main!(benches);
