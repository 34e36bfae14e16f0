use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use probabilistic_sketches::hyperloglog::HyperLogLog;

fn bench_add(c: &mut Criterion) {
    c.bench_function("bench add", |b| {
        b.iter_batched_ref(
            || HyperLogLog::<[u8; 4]>::new(14).unwrap(),
            |hll| hll.add(&0xDEAD_BEEFu32.to_le_bytes()).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_estimate(c: &mut Criterion) {
    for &precision in &[4, 10, 16] {
        let mut hll = HyperLogLog::<[u8; 4]>::new(precision).unwrap();
        for i in 0..100_000u32 {
            hll.add(&i.to_le_bytes()).unwrap();
        }
        c.bench_function(&format!("bench estimate {}", precision), |b| {
            b.iter(|| hll.estimate())
        });
    }
}

criterion_group!(benches, bench_add, bench_estimate);
criterion_main!(benches);
