//! Throughput benchmarks for the NukeKV store engine and command handlers.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nukekv::commands::CommandHandler;
use nukekv::config::{Config, Settings};
use nukekv::storage::StoreEngine;

fn bench_engine(settings: Settings) -> Arc<StoreEngine> {
    Arc::new(StoreEngine::new(Arc::new(settings)))
}

fn quiet_config() -> Config {
    Config {
        persistence: false,
        ..Default::default()
    }
}

/// Raw store mutations under the write lock.
fn bench_store_ops(c: &mut Criterion) {
    let engine = bench_engine(Settings::from_config(&quiet_config()));

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            engine.write().insert(&key, "small_value".to_string());
            i += 1;
        });
    });

    group.bench_function("insert_medium", |b| {
        let mut i = 0u64;
        let value = "x".repeat(1024);
        b.iter(|| {
            let key = format!("key:{}", i);
            engine.write().insert(&key, value.clone());
            i += 1;
        });
    });

    group.bench_function("get_existing", |b| {
        for i in 0..100_000u64 {
            engine
                .write()
                .insert(&format!("seed:{}", i), format!("value:{}", i));
        }
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("seed:{}", i % 100_000);
            black_box(engine.read().get(&key).map(str::to_string));
            i += 1;
        });
    });

    group.finish();
}

/// Full command path: arity checks, lock discipline, dirty accounting.
fn bench_handler_ops(c: &mut Criterion) {
    let engine = bench_engine(Settings::from_config(&quiet_config()));
    let handler = CommandHandler::new(engine);

    let mut group = c.benchmark_group("handler");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let args = vec![format!("key:{}", i), "value".to_string()];
            black_box(handler.execute("SET", &args));
            i += 1;
        });
    });

    group.bench_function("get_hit", |b| {
        handler.execute("SET", &["hot".to_string(), "value".to_string()]);
        b.iter(|| {
            black_box(handler.execute("GET", &["hot".to_string()]));
        });
    });

    group.bench_function("incr", |b| {
        b.iter(|| {
            black_box(handler.execute("INCR", &["counter".to_string()]));
        });
    });

    group.finish();
}

/// Eviction pressure: every insert lands over the limit and pops the tail.
fn bench_eviction(c: &mut Criterion) {
    let config = Config {
        memory_limit: 64 * 1024,
        persistence: false,
        ..Default::default()
    };
    let engine = bench_engine(Settings::from_config(&config));

    let mut group = c.benchmark_group("eviction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_at_capacity", |b| {
        let mut i = 0u64;
        let value = "x".repeat(512);
        b.iter(|| {
            let mut store = engine.write();
            store.insert(&format!("key:{}", i), value.clone());
            black_box(store.enforce_memory_limit());
            i += 1;
        });
    });

    group.finish();
}

/// JSON document search over a mid-sized array.
fn bench_json_search(c: &mut Criterion) {
    let engine = bench_engine(Settings::from_config(&quiet_config()));
    let handler = CommandHandler::new(engine);

    let items: Vec<String> = (0..500)
        .map(|i| format!(r#"{{"id":{},"t":"item number {} with some words"}}"#, i, i))
        .collect();
    let doc = format!("[{}]", items.join(","));
    handler.execute("JSON.SET", &["docs".to_string(), doc]);

    let mut group = c.benchmark_group("json");
    group.throughput(Throughput::Elements(1));

    group.bench_function("search_no_match", |b| {
        b.iter(|| {
            black_box(handler.execute(
                "JSON.SEARCH",
                &["docs".to_string(), "absent".to_string()],
            ));
        });
    });

    group.bench_function("search_bounded", |b| {
        b.iter(|| {
            black_box(handler.execute(
                "JSON.SEARCH",
                &[
                    "docs".to_string(),
                    "words".to_string(),
                    "MAX".to_string(),
                    "10".to_string(),
                ],
            ));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store_ops,
    bench_handler_ops,
    bench_eviction,
    bench_json_search
);
criterion_main!(benches);
