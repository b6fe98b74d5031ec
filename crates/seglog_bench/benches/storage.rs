//! Store and index benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seglog_bench::random_data;
use seglog_storage::{Index, Store};
use tempfile::TempDir;

/// Benchmark Store append operations.
fn bench_store_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_append");

    // Use larger sample size for file operations
    group.sample_size(50);

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let store = Store::open(&temp_dir.path().join("0.store")).unwrap();
            let data = random_data(size);

            b.iter(|| {
                let result = store.append(black_box(&data)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark Store read operations.
fn bench_store_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_read");
    group.sample_size(50);

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let store = Store::open(&temp_dir.path().join("0.store")).unwrap();
            let (_, pos) = store.append(&random_data(size)).unwrap();

            b.iter(|| {
                let result = store.read(black_box(pos)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark Store sync operations.
fn bench_store_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_sync");
    group.sample_size(20); // Sync is slow

    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(&temp_dir.path().join("0.store")).unwrap();
    let data = random_data(1024);

    group.bench_function("after_1kb_write", |b| {
        b.iter(|| {
            store.append(&data).unwrap();
            store.sync().unwrap();
        });
    });

    group.finish();
}

/// Benchmark Index write and lookup.
fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    let entries = 10_000u32;

    group.bench_function("write_10000", |b| {
        b.iter(|| {
            let temp_dir = TempDir::new().unwrap();
            let index = Index::open(&temp_dir.path().join("0.index"), u64::from(entries) * 12)
                .unwrap();
            for i in 0..entries {
                index.write(black_box(i), u64::from(i) * 64).unwrap();
            }
            black_box(index.size());
        });
    });

    group.bench_function("read_random_of_10000", |b| {
        let temp_dir = TempDir::new().unwrap();
        let index =
            Index::open(&temp_dir.path().join("0.index"), u64::from(entries) * 12).unwrap();
        for i in 0..entries {
            index.write(i, u64::from(i) * 64).unwrap();
        }

        let mut idx = 0i64;
        b.iter(|| {
            // Read entries in pseudo-random order
            let entry = (idx * 7) % i64::from(entries);
            let result = index.read(black_box(entry)).unwrap();
            idx = (idx + 1) % i64::from(entries);
            black_box(result);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store_append,
    bench_store_read,
    bench_store_sync,
    bench_index,
);

criterion_main!(benches);
