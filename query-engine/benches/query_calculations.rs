//! FILENAME: query-engine/benches/query_calculations.rs
//! Criterion benchmarks for the filter and query paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use engine::{apply_filters, CropRecord, CropTable, FilterSelection};
use query_engine::{compute_dashboard, QueryConfig, QueryEngine};

const STATES: [&str; 4] = ["Bihar", "Punjab", "Kerala", "Assam"];
const CROPS: [&str; 5] = ["Wheat", "Barley", "Rice", "Maize", "Jute"];
const SEASONS: [&str; 2] = ["Rabi", "Kharif"];

/// Deterministic synthetic dataset with `rows` records.
fn create_test_table(rows: usize) -> CropTable {
    (0..rows)
        .map(|i| {
            let state = STATES[i % STATES.len()];
            let district = format!("{}-D{}", state, (i / 7) % 25);
            let crop = CROPS[(i / 3) % CROPS.len()];
            let season = SEASONS[i % SEASONS.len()];
            let start = 1997 + (i % 20);
            let year = format!("{}-{:02}", start, (start + 1) % 100);

            let area = 100.0 + (i % 997) as f64 * 3.5;
            let crop_yield = 0.5 + (i % 31) as f64 / 10.0;
            CropRecord::new(state, district, crop, season, year)
                .with_measures(area, area * crop_yield, crop_yield)
        })
        .collect()
}

fn bench_apply_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_filters");
    let selection = FilterSelection::new()
        .with_states(["Bihar", "Punjab"])
        .with_crops(["Wheat", "Rice"]);

    for rows in [10_000, 100_000] {
        let table = create_test_table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| apply_filters(black_box(table), black_box(&selection)))
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let table = create_test_table(100_000);
    let engine = QueryEngine::default();

    c.bench_function("correlation_100k", |b| {
        b.iter(|| engine.correlation(black_box(&table)))
    });
    c.bench_function("time_series_100k", |b| {
        b.iter(|| engine.time_series(black_box(&table)))
    });
    c.bench_function("yield_by_district_100k", |b| {
        b.iter(|| engine.yield_by_district(black_box(&table)))
    });
    c.bench_function("seasonal_trends_100k", |b| {
        b.iter(|| engine.seasonal_trends(black_box(&table)))
    });
    c.bench_function("states_with_decline_100k", |b| {
        b.iter(|| engine.states_with_decline(black_box(&table), "Wheat", 10.0))
    });
}

fn bench_dashboard(c: &mut Criterion) {
    let table = create_test_table(100_000);
    let selection = FilterSelection::new().with_seasons(["Rabi"]);
    let config = QueryConfig::default().with_top_districts_limit(10);

    c.bench_function("dashboard_100k", |b| {
        b.iter(|| compute_dashboard(black_box(&table), black_box(&selection), &config))
    });
}

criterion_group!(benches, bench_apply_filters, bench_queries, bench_dashboard);
criterion_main!(benches);
