use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use swr_loader::{
    CacheKey, ErrorMode, MemoryAdapter, MokaAdapter, MokaAdapterConfig, SwrCache, SwrOptions,
};
use tokio::runtime::Runtime;

fn options(key: CacheKey) -> SwrOptions {
    SwrOptions {
        cache_key: key,
        max_age_ms: 60_000,
        on_error: ErrorMode::Throw,
    }
}

fn keys(count: usize) -> Vec<CacheKey> {
    (0..count)
        .map(|i| CacheKey::new(["users".to_string(), i.to_string()]))
        .collect()
}

async fn populated_cache(
    adapter: Arc<dyn swr_loader::CacheAdapter<String>>,
    keys: &[CacheKey],
) -> SwrCache<String> {
    let cache = SwrCache::new(adapter);
    for key in keys {
        cache.mutate(key, format!("value for {}", key)).await.unwrap();
    }
    cache
}

/// Benchmark 1: Hot cache - every call takes the fast path (no fetch, no
/// write).
fn bench_hot_cache(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("hot_cache");

    let keys = keys(1_000);
    group.throughput(Throughput::Elements(keys.len() as u64));

    for adapter_name in ["memory", "moka"] {
        group.bench_with_input(
            BenchmarkId::new(adapter_name, keys.len()),
            &adapter_name,
            |b, &name| {
                let adapter: Arc<dyn swr_loader::CacheAdapter<String>> = match name {
                    "memory" => Arc::new(MemoryAdapter::new()),
                    _ => Arc::new(MokaAdapter::new(MokaAdapterConfig::default())),
                };
                let cache = rt.block_on(populated_cache(adapter, &keys));
                let keys = keys.clone();

                b.to_async(&rt).iter(|| {
                    let cache = cache.clone();
                    let keys = keys.clone();
                    async move {
                        for key in keys {
                            let result = cache
                                .swr(options(key), |_k| async { Ok("unused".to_string()) })
                                .await
                                .unwrap();
                            black_box(result.fresh.await.unwrap());
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark 2: Cold cache - every call misses and runs the fetch + write
/// path.
fn bench_cold_cache(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cold_cache");

    let keys = keys(1_000);
    group.throughput(Throughput::Elements(keys.len() as u64));

    group.bench_function("memory", |b| {
        b.to_async(&rt).iter(|| {
            let keys = keys.clone();
            async move {
                let adapter = Arc::new(MemoryAdapter::new());
                let cache: SwrCache<String> = SwrCache::new(adapter);
                for key in keys {
                    let result = cache
                        .swr(options(key), |k| async move { Ok(format!("value for {}", k)) })
                        .await
                        .unwrap();
                    black_box(result.fresh.await.unwrap());
                }
            }
        });
    });

    group.finish();
}

/// Benchmark 3: Mutation throughput (direct writes, no fetch path).
fn bench_mutate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("mutate");

    let keys = keys(1_000);
    group.throughput(Throughput::Elements(keys.len() as u64));

    group.bench_function("memory", |b| {
        let adapter = Arc::new(MemoryAdapter::new());
        let cache: SwrCache<String> = SwrCache::new(adapter);

        b.to_async(&rt).iter(|| {
            let cache = cache.clone();
            let keys = keys.clone();
            async move {
                for key in keys {
                    cache.mutate(&key, "value".to_string()).await.unwrap();
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hot_cache, bench_cold_cache, bench_mutate);
criterion_main!(benches);
