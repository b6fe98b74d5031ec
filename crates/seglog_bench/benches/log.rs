//! Log benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seglog_bench::{populated_log, random_data, temp_log};
use seglog_core::{Config, Record};
use std::io::Read;

/// Benchmark appends, including the cost of rotation.
fn bench_log_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_append");
    group.sample_size(50);

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let config = Config::new()
                .max_store_bytes(1024 * 1024)
                .max_index_bytes(64 * 1024);
            let (_dir, log) = temp_log(config);
            let data = random_data(size);

            b.iter(|| {
                let offset = log.append(Record::new(black_box(data.clone()))).unwrap();
                black_box(offset);
            });
        });
    }

    group.finish();
}

/// Benchmark random reads across many segments.
fn bench_log_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_read");

    for segments in [1u64, 16, 128].iter() {
        group.bench_with_input(
            BenchmarkId::new("segments", segments),
            segments,
            |b, &segments| {
                let record_count = 2048u64;
                let per_segment = record_count / segments;
                let config = Config::new()
                    .max_store_bytes(u64::MAX)
                    .max_index_bytes(per_segment * 12);
                let (_dir, log) = populated_log(config, record_count as usize, 128);

                let mut idx = 0u64;
                b.iter(|| {
                    let offset = (idx * 7) % record_count;
                    let record = log.read(black_box(offset)).unwrap();
                    idx = (idx + 1) % record_count;
                    black_box(record);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark streaming the raw bytes of a whole log.
fn bench_log_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_reader");
    group.sample_size(20);

    let config = Config::new().max_store_bytes(64 * 1024);
    let (_dir, log) = populated_log(config, 4096, 256);
    let total: u64 = log.segments().unwrap().iter().map(|s| s.store_bytes).sum();
    group.throughput(Throughput::Bytes(total));

    group.bench_function("read_to_end", |b| {
        b.iter(|| {
            let mut bytes = Vec::new();
            log.reader().unwrap().read_to_end(&mut bytes).unwrap();
            black_box(bytes.len());
        });
    });

    group.bench_function("decode_records", |b| {
        b.iter(|| {
            let count = log.reader().unwrap().map(Result::unwrap).count();
            black_box(count);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_log_append, bench_log_read, bench_log_reader);

criterion_main!(benches);
