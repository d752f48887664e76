use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lrucache::trace::{replay, Trace};
use lrucache::{LruCache, SharedCache};

fn bench_cached_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit_1k", |b| {
        let mut cache = LruCache::new(1000).unwrap();
        for key in 0..1000u64 {
            cache.put(key, vec![b'x'; 64]);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 1000)).is_some());
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
        let mut cache = LruCache::new(1000).unwrap();
        for key in 0..1000u64 {
            cache.put(key, key);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter.is_multiple_of(2) {
                black_box(cache.get(&(counter % 1000)).copied());
            } else {
                cache.put(black_box(counter % 1500), counter);
            }
            counter += 1;
        });
    });

    group.bench_function("50_read_50_write_shared", |b| {
        let cache = SharedCache::new(1000).unwrap();
        for key in 0..1000u64 {
            cache.put(key, key);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter.is_multiple_of(2) {
                black_box(cache.get(&(counter % 1000)));
            } else {
                cache.put(black_box(counter % 1500), counter);
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_evicting_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("evicting_put");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_always_evicts", |b| {
        let mut cache = LruCache::new(10).unwrap();

        // Every key is new, so every put past the tenth evicts
        let mut counter = 0u64;
        b.iter(|| {
            cache.put(black_box(counter), counter);
            counter += 1;
        });
    });

    group.finish();
}

fn bench_reference_trace(c: &mut Criterion) {
    let trace = Trace::reference();

    c.bench_function("replay_reference_trace", |b| {
        b.iter(|| black_box(replay(&trace).unwrap().is_success()));
    });
}

criterion_group!(
    benches,
    bench_cached_get,
    bench_mixed_50_50,
    bench_evicting_put,
    bench_reference_trace
);
criterion_main!(benches);
