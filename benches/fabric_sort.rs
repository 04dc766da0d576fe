use criterion::{
    BenchmarkId, Criterion, Throughput, black_box, criterion_group,
    criterion_main,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hypersort::comm::Comm;
use hypersort::fabric;
use hypersort::sort::bitonic_sort;

const TASKS: usize = 4;

fn random_keys(size: usize) -> Vec<u64> {
    let rng = ChaCha8Rng::seed_from_u64(size as u64);
    rng.random_iter::<u64>().take(size).collect()
}

fn bench_fabric_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("fabric bitonic");

    for size_exp in [10, 12, 14, 16] {
        let size = 1usize << size_exp;
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &size,
            |b, &size| {
                b.iter_batched(
                    || random_keys(size),
                    |data| {
                        let each = data.len() / TASKS;
                        fabric::spawn(TASKS, |node| {
                            let at = node.rank() * each;
                            let mut block = data[at..at + each].to_vec();
                            bitonic_sort(black_box(&mut block), &node)?;
                            Ok(block)
                        })
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_single_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("single task");

    for size_exp in [10, 12, 14, 16] {
        let size = 1usize << size_exp;
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &size,
            |b, &size| {
                b.iter_batched(
                    || random_keys(size),
                    |mut data| {
                        black_box(&mut data).sort_unstable();
                        data
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fabric_sort, bench_single_sort);
criterion_main!(benches);
