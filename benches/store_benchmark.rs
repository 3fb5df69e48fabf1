//! Performance benchmarks for any-redis-store
//!
//! This benchmark suite measures:
//! - Store operations over the in-memory client (set, get, delete, has)
//! - Adapter overhead against direct client calls
//! - Clear across different namespace sizes
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use any_redis_store::{AnyRedisStore, MemoryClient, PromiseCommands};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

// ============================================================================
// Benchmark Test Fixtures
// ============================================================================

fn bench_value(size: usize) -> String {
    "x".repeat(size)
}

/// Store pre-populated with `count` keys under the default namespace
async fn populated_store(count: usize, value_size: usize) -> AnyRedisStore {
    let client = MemoryClient::new();
    let store = AnyRedisStore::new(&client).expect("Failed to create store");
    let value = bench_value(value_size);
    for i in 0..count {
        store
            .set(&format!("key{}", i), &value, None)
            .await
            .expect("Failed to populate store");
    }
    store
}

// ============================================================================
// Store operations
// ============================================================================

fn bench_store_set(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("store_set");

    for size in [64, 1024, 16384] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let client = MemoryClient::new();
            let store = AnyRedisStore::new(&client).expect("Failed to create store");
            let value = bench_value(size);
            b.to_async(&rt).iter(|| async {
                store
                    .set(black_box("bench-key"), black_box(&value), None)
                    .await
                    .expect("Failed to set");
            });
        });
    }

    group.finish();
}

fn bench_store_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("store_get");

    let store = rt.block_on(populated_store(1, 1024));
    group.bench_function("hit", |b| {
        b.to_async(&rt).iter(|| async {
            let value = store
                .get(black_box("key0"))
                .await
                .expect("Failed to get");
            black_box(value);
        });
    });

    group.bench_function("miss", |b| {
        b.to_async(&rt).iter(|| async {
            let value = store
                .get(black_box("absent"))
                .await
                .expect("Failed to get");
            black_box(value);
        });
    });

    group.finish();
}

fn bench_store_delete(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("store_delete");

    let client = MemoryClient::new();
    let store = AnyRedisStore::new(&client).expect("Failed to create store");
    group.bench_function("set_then_delete", |b| {
        b.to_async(&rt).iter(|| async {
            store
                .set("bench-key", "value", None)
                .await
                .expect("Failed to set");
            let removed = store.delete("bench-key").await.expect("Failed to delete");
            black_box(removed);
        });
    });

    group.finish();
}

fn bench_store_has(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("store_has");

    let store = rt.block_on(populated_store(1, 64));
    group.bench_function("member", |b| {
        b.to_async(&rt).iter(|| async {
            let present = store.has(black_box("key0")).await.expect("Failed to check");
            black_box(present);
        });
    });

    group.finish();
}

fn bench_store_clear(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("store_clear");

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.to_async(&rt).iter(|| async {
                let store = populated_store(count, 64).await;
                store.clear().await.expect("Failed to clear");
            });
        });
    }

    group.finish();
}

// ============================================================================
// Adapter overhead
// ============================================================================

fn bench_adapter_overhead(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let mut group = c.benchmark_group("adapter_overhead");

    let client = MemoryClient::new();
    let commands = any_redis_store::create(&client).expect("Failed to adapt client");
    rt.block_on(async {
        commands
            .set("key", "value", None)
            .await
            .expect("Failed to seed");
    });

    group.bench_function("direct_get", |b| {
        b.to_async(&rt).iter(|| async {
            let value = commands.get(black_box("key")).await.expect("Failed to get");
            black_box(value);
        });
    });

    let store = AnyRedisStore::new(&client).expect("Failed to create store");
    rt.block_on(async {
        store
            .set("key", "value", None)
            .await
            .expect("Failed to seed store");
    });

    group.bench_function("store_get", |b| {
        b.to_async(&rt).iter(|| async {
            let value = store.get(black_box("key")).await.expect("Failed to get");
            black_box(value);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store_set,
    bench_store_get,
    bench_store_delete,
    bench_store_has,
    bench_store_clear,
    bench_adapter_overhead,
);
criterion_main!(benches);
