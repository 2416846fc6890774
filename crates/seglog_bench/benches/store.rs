//! Store append and read benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seglog_bench::{random_data, random_payloads};
use seglog_store::{MemoryFile, Store, StoreConfig};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn open_file_store(dir: &TempDir, config: StoreConfig) -> Store {
    Store::open(&dir.path().join("bench.store"), config).unwrap()
}

/// Benchmark appends into a memory-backed store.
fn bench_memory_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_append");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let store = Store::new(MemoryFile::new()).unwrap();
            let data = random_data(size);

            b.iter(|| {
                let appended = store.append(black_box(&data)).unwrap();
                black_box(appended);
            });
        });
    }

    group.finish();
}

/// Benchmark appends into a file-backed store.
fn bench_file_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_append");

    // Use larger sample size for file operations
    group.sample_size(50);

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let store = open_file_store(&temp_dir, StoreConfig::default());
            let data = random_data(size);

            b.iter(|| {
                let appended = store.append(black_box(&data)).unwrap();
                black_box(appended);
            });
        });
    }

    group.finish();
}

/// Compare write buffer capacities on a file-backed store.
fn bench_buffer_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_capacity");
    group.sample_size(20);

    let data = random_data(128);
    for capacity in [0usize, 4 * 1024, 64 * 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    let temp_dir = TempDir::new().unwrap();
                    let store = open_file_store(
                        &temp_dir,
                        StoreConfig::new()
                            .buffer_capacity(capacity)
                            .sync_on_close(false),
                    );
                    for _ in 0..1000 {
                        store.append(black_box(&data)).unwrap();
                    }
                    store.close().unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark reads of already-flushed records.
fn bench_file_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_read");
    group.sample_size(50);

    for size in [256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let store = open_file_store(&temp_dir, StoreConfig::default());
            let position = store.append(&random_data(size)).unwrap().position;
            store.flush().unwrap();

            b.iter(|| {
                let payload = store.read(black_box(position)).unwrap();
                black_box(payload);
            });
        });
    }

    group.finish();
}

/// Benchmark append immediately followed by read (forces a flush each time).
fn bench_append_then_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_then_read");
    group.sample_size(50);

    let temp_dir = TempDir::new().unwrap();
    let store = open_file_store(&temp_dir, StoreConfig::default());
    let data = random_data(256);

    group.bench_function("256b", |b| {
        b.iter(|| {
            let position = store.append(&data).unwrap().position;
            black_box(store.read(position).unwrap());
        });
    });

    group.finish();
}

/// Benchmark random reads from several threads sharing one store.
fn bench_concurrent_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_read");
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(open_file_store(&temp_dir, StoreConfig::default()));
    let positions: Arc<Vec<u64>> = Arc::new(
        random_payloads(1000, 64, 512)
            .iter()
            .map(|p| store.append(p).unwrap().position)
            .collect(),
    );
    store.flush().unwrap();

    for threads in [1usize, 4].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            threads,
            |b, &threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let store = Arc::clone(&store);
                            let positions = Arc::clone(&positions);
                            thread::spawn(move || {
                                for i in 0..250 {
                                    let position = positions[(i * 7 + t * 13) % positions.len()];
                                    black_box(store.read(position).unwrap());
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_memory_append,
    bench_file_append,
    bench_buffer_capacity,
    bench_file_read,
    bench_append_then_read,
    bench_concurrent_read,
);

criterion_main!(benches);
