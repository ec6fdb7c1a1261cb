use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbr::prelude::*;

/// SELECT col0, col1, ... FROM t WHERE (col0 = ?) AND (col1 = ?) ...
fn build_select(n: usize) -> dbr::Select {
    let mut stmt = select((0..n).map(|i| format!("col{i}"))).from("t");
    for i in 0..n {
        stmt = stmt.filter(col(format!("col{i}")).int(i as i64));
    }
    stmt
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_sql/placeholders");

    for n in [1, 5, 10, 50, 100] {
        let stmt = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.to_sql()));
        });
    }

    group.finish();
}

fn bench_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_sql/cached");

    for n in [1, 5, 10, 50, 100] {
        let stmt = build_select(n).build_cache(true);
        let _ = stmt.to_sql();
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.to_sql()));
        });
    }

    group.finish();
}

fn bench_interpolated(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_sql/interpolated");

    for n in [1, 5, 10, 50, 100] {
        let stmt = build_select(n).interpolate();
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.to_sql()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_sql/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let stmt = select(["*"])
                    .from("t")
                    .filter(col("id").ints(values.iter().copied()));
                black_box(stmt.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_deferred(c: &mut Criterion) {
    let stmt = update("users")
        .set_deferred_columns(["name", "email"])
        .filter(col("id").deferred())
        .build_cache(true);
    let record = JsonRecord::from_serialize(&serde_json::json!({
        "id": 1,
        "name": "ann",
        "email": "ann@example.com",
    }))
    .unwrap_or_default();

    c.bench_function("to_sql/deferred_record", |b| {
        b.iter(|| black_box(stmt.to_sql_record(&record)));
    });
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_cached,
    bench_interpolated,
    bench_in_list,
    bench_deferred
);
criterion_main!(benches);
