use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use probabilistic_sketches::count_min_sketch::CountMinSketch;
use probabilistic_sketches::top_k::{CountAllTopK, HeavyKeeperTopK};

fn bench_add(c: &mut Criterion) {
    for &epsilon in &[0.01, 0.001] {
        c.bench_function(&format!("bench add epsilon {}", epsilon), |b| {
            b.iter_batched_ref(
                || CountMinSketch::<[u8; 4]>::new(epsilon, 0.01).unwrap(),
                |cms| cms.add(&0xDEAD_BEEFu32.to_le_bytes(), 1).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_top_k(c: &mut Criterion) {
    c.bench_function("bench count-all top-k 10000", |b| {
        b.iter_batched_ref(
            || CountAllTopK::<[u8; 4]>::new(0.001, 0.01, 10).unwrap(),
            |top_k| {
                for i in 0..10_000u32 {
                    top_k.add(&(i % 1000).to_le_bytes(), 1).unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });
    c.bench_function("bench heavy keeper 10000", |b| {
        b.iter_batched_ref(
            || HeavyKeeperTopK::<[u8; 4]>::new(4, 1024, 10, 1.08).unwrap(),
            |top_k| {
                for i in 0..10_000u32 {
                    top_k.insert(&(i % 1000).to_le_bytes()).unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_add, bench_top_k);
criterion_main!(benches);
