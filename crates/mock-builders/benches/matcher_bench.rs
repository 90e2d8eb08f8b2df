use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mock_builders::matcher::{is_equal, is_match, lowercase_keys};
use mock_builders::{
    FactoryOptions, HandlerList, HandlerOptions, MatcherSet, MockRequest, MockResponse,
    RestHandlersFactory,
};
use serde_json::{json, Map, Value};

fn wide_object(keys: usize) -> Value {
    let map: Map<String, Value> = (0..keys)
        .map(|i| (format!("Key-{i}"), json!(format!("value-{i}"))))
        .collect();
    Value::Object(map)
}

fn bench_deep_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_equality");

    for keys in [4, 32, 256].iter() {
        let expected = wide_object(*keys);
        let actual = expected.clone();

        group.throughput(Throughput::Elements(*keys as u64));
        group.bench_with_input(BenchmarkId::new("is_equal", keys), keys, |b, _| {
            b.iter(|| is_equal(black_box(&expected), black_box(&actual)))
        });
        group.bench_with_input(BenchmarkId::new("is_match", keys), keys, |b, _| {
            b.iter(|| is_match(black_box(&actual), black_box(&expected)))
        });
        group.bench_with_input(BenchmarkId::new("lowercase_keys", keys), keys, |b, _| {
            b.iter(|| lowercase_keys(black_box(&actual)))
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let rest = RestHandlersFactory::new(FactoryOptions::new("https://www.example.org"));

    for handler_count in [10, 100, 500].iter() {
        // Every handler shares the path; only the last one accepts the body
        let mut handlers = HandlerList::new();
        for i in 0..*handler_count {
            handlers.push(
                rest.post(
                    "/test",
                    MatcherSet::new()
                        .headers(json!({"auth": "token-123"}))
                        .body(json!({"input": format!("user-{i}")})),
                    MockResponse::json(&json!({"handler": i})),
                    HandlerOptions::new(),
                )
                .unwrap(),
            );
        }

        let request = MockRequest::post("https://www.example.org/test")
            .unwrap()
            .with_header("AUTH", "token-123")
            .with_header("user-agent", "bench")
            .with_json(&json!({"input": format!("user-{}", handler_count - 1)}));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("match_last", handler_count),
            handler_count,
            |b, _| {
                b.iter(|| {
                    runtime
                        .block_on(handlers.dispatch(black_box(&request)))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_deep_equality, bench_dispatch);
criterion_main!(benches);
