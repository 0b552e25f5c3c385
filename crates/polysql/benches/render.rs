use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polysql::{Dialect, Select, Statement, Value, qb};

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ... for `dialect`.
fn build_select(dialect: Dialect, n: usize) -> Select {
    let mut q = qb::select(dialect);
    q.columns((0..n).map(|i| format!("col{i}"))).from("t");
    for i in 0..n {
        q.where_clause().eq(format!("col{i}"), Value::param(i as i64));
    }
    q
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for dialect in Dialect::ALL {
        for n in [1, 10, 50] {
            let q = build_select(dialect, n);
            group.bench_with_input(
                BenchmarkId::new(dialect.name(), n),
                &q,
                |b, q| {
                    b.iter(|| black_box(q.build()));
                },
            );
        }
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/parse");

    let conditions = [
        "age >= 18",
        "name LIKE 'a%'",
        "id IN (1, 2, 3, 4, 5)",
        "created_at BETWEEN '2024-01-01' AND '2024-12-31'",
    ];
    for text in conditions {
        group.bench_with_input(BenchmarkId::from_parameter(text), &text, |b, text| {
            b.iter(|| black_box(polysql::parse_expression(text)));
        });
    }

    let keys = ["%name%", "id-", "age>=", "status"];
    for key in keys {
        group.bench_with_input(BenchmarkId::new("shorthand", key), &key, |b, key| {
            b.iter(|| black_box(polysql::parse_shorthand(key, Value::from(1))));
        });
    }

    group.finish();
}

fn bench_sql_server_paging(c: &mut Criterion) {
    let mut q = build_select(Dialect::SqlServer, 10);
    q.order_by("col0 DESC").paginate(5, 20);
    c.bench_function("render/sql_server_paging", |b| {
        b.iter(|| black_box(q.render()));
    });
}

criterion_group!(benches, bench_render, bench_parse, bench_sql_server_paging);
criterion_main!(benches);
