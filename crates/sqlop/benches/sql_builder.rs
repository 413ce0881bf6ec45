use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlop::dialect::{MySql, Postgres};
use sqlop::{ArgsBuilder, Op, Select, Statement, select, update};

/// SELECT col0, col1, ... FROM t WHERE col0=? AND col1=? ...
fn build_select(n: usize) -> Select {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let filters: Vec<Op> = (0..n).map(|i| Op::eq(format!("col{i}"), i as i64)).collect();
    select(columns).from("t").filters(filters)
}

fn bench_select_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/select_build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).build_with(Arc::new(Postgres))));
        });
    }

    group.finish();
}

fn bench_render_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/render_only");

    for n in [1, 5, 10, 50, 100] {
        let stmt = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build_with(Arc::new(MySql))));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        let op = Op::in_list("id", values);
        group.bench_with_input(BenchmarkId::from_parameter(n), &op, |b, op| {
            b.iter(|| {
                let mut args = ArgsBuilder::new(Arc::new(Postgres));
                black_box(sqlop::op::compile(&mut args, op))
            });
        });
    }

    group.finish();
}

fn bench_update_setters(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/update_setters");

    for n in [1, 5, 10, 50] {
        let setters: Vec<Op> = (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Op::set(format!("col{i}"), i as i64)
                } else {
                    Op::add(format!("col{i}"), 1)
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &setters, |b, setters| {
            b.iter(|| {
                let stmt = update("t")
                    .set_all(setters.iter().cloned())
                    .filter(Op::eq("id", 1));
                black_box(stmt.build_with(Arc::new(MySql)))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_build,
    bench_render_only,
    bench_in_list,
    bench_update_setters
);
criterion_main!(benches);
