//! Benchmark for scope construction, rendering and resolution

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scope_tree::scope::cache;
use scope_tree::{
    parse, Catalog, CompoundCondition, Junction, ModelRef, Record, Scalar, Scope, ScopeItem,
};

const CATALOG: &str = r#"{
  "models": [
    {
      "table": "customer",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "name" },
        { "name": "age", "type": "integer" },
        { "name": "status" }
      ],
      "references": [
        { "link": "orders", "model": "order", "their_field": "customer_id" }
      ]
    },
    {
      "table": "order",
      "fields": [
        { "name": "id", "type": "integer" },
        { "name": "customer_id", "type": "integer" },
        { "name": "status" },
        { "name": "total", "type": "float" }
      ]
    }
  ]
}"#;

fn customer() -> ModelRef {
    Catalog::from_json(CATALOG)
        .and_then(|catalog| catalog.model("customer"))
        .expect("benchmark catalog")
}

/// A realistic filter: 20 age ranges, each OR-ed with a status list
fn create_scope() -> CompoundCondition {
    let ranges = (0..20).map(|i| {
        ScopeItem::from(CompoundCondition::new(
            [
                ScopeItem::from(("age", ">=", i * 5)),
                ScopeItem::from(("age", "<", i * 5 + 5)),
                ScopeItem::any_of([("status", "new"), ("status", "active")]),
            ],
            Junction::And,
        ))
    });
    CompoundCondition::create_or(ranges)
}

fn benchmark_scope(c: &mut Criterion) {
    let model = customer();
    let mut scope = create_scope();
    scope.bind(&model).expect("bind");

    c.bench_function("build_scope", |b| b.iter(|| black_box(create_scope())));

    c.bench_function("negate_scope", |b| {
        b.iter(|| {
            let mut negated = scope.clone();
            negated.negate().expect("negate");
            black_box(negated)
        })
    });

    c.bench_function("to_words", |b| b.iter(|| black_box(scope.to_words().expect("words"))));

    c.bench_function("to_query_arguments", |b| {
        b.iter(|| black_box(scope.to_query_arguments().expect("arguments")))
    });

    let mut chained = CompoundCondition::create_and([("orders/status", "shipped")]);
    chained.bind(&model).expect("bind");
    c.bench_function("chained_key", |b| {
        b.iter(|| black_box(chained.to_query_arguments().expect("arguments")))
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let text = "age>=18 & (status=active | status=new) & orders/# > 2";

    c.bench_function("parse", |b| b.iter(|| black_box(parse(black_box(text)))));

    cache::clear_cache();
    c.bench_function("parse_cached", |b| {
        b.iter(|| black_box(cache::get_or_parse(black_box(text))))
    });

    let scope: Scope = create_scope().into();
    let record = Record::from_iter([
        ("age".to_string(), Scalar::Int(42)),
        ("status".to_string(), Scalar::Str("active".to_string())),
    ]);
    c.bench_function("check", |b| {
        b.iter(|| black_box(scope_tree::check(&scope, &record).expect("check")))
    });
}

criterion_group!(benches, benchmark_scope, benchmark_parse);
criterion_main!(benches);
