use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lrucache::LruCache;

fn bench_cached_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_1kb_hit", |b| {
        let cache = LruCache::new(1000).unwrap();
        let data = vec![b'x'; 1024];

        for id in 0..100u64 {
            cache.put(id, data.clone());
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write", |b| {
        let cache = LruCache::new(1000).unwrap();

        for id in 0..100u64 {
            cache.put(id, id);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter % 2 == 0 {
                black_box(cache.get(&(counter % 100)));
            } else {
                black_box(cache.put(100 + counter, counter));
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_miss_then_put", |b| {
        // Small cache cycling through more keys than it holds
        let cache = LruCache::new(10).unwrap();

        let mut counter = 0u64;
        b.iter(|| {
            let key = counter % 100;
            if cache.get(&key).is_none() {
                cache.put(key, counter);
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    group.sample_size(20);
    group.throughput(Throughput::Elements(4 * 1000));

    group.bench_function("4_threads_put_get", |b| {
        let cache = Arc::new(LruCache::new(512).unwrap());

        b.iter(|| {
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..500u64 {
                            let key = t * 1000 + i;
                            cache.put(key, i);
                            black_box(cache.get(&key));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_get,
    bench_mixed_50_50,
    bench_cache_miss,
    bench_contended
);
criterion_main!(benches);
