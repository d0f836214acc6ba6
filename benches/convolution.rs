use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fps_core::{ArbitraryConvolution, Mint, Mint32, Mod32, NttConvolution, NttFps};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type M998 = Mod32<998244353>;
type M1e9 = Mod32<1_000_000_007>;

fn random_series(n: usize, m: u64, rng: &mut StdRng) -> Vec<u64> {
    (0..n).map(|_| rng.gen_range(0..m)).collect()
}

fn bench_ntt_convolution(c: &mut Criterion) {
    let conv = NttConvolution::<M998>::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut group = c.benchmark_group("ntt_convolution");
    for n in [1 << 10, 1 << 14, 1 << 17] {
        let a: Vec<Mint32<998244353>> = random_series(n, 998244353, &mut rng)
            .into_iter()
            .map(Mint::from)
            .collect();
        let b = a.clone();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| conv.convolve(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

fn bench_arbitrary_convolution(c: &mut Criterion) {
    let conv = ArbitraryConvolution::<M1e9>::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("arbitrary_convolution");
    for n in [1 << 10, 1 << 14, 1 << 17] {
        let a = random_series(n, 1_000_000_007, &mut rng);
        let b = random_series(n, 1_000_000_007, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| conv.convolve_raw(black_box(&a), black_box(&b)));
        });
    }
    group.finish();
}

fn bench_series_inverse(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut group = c.benchmark_group("series_inverse");
    for n in [1 << 10, 1 << 14] {
        let mut coef = random_series(n, 998244353, &mut rng);
        coef[0] = 1;
        let f = NttFps::<998244353>::from(
            coef.into_iter()
                .map(Mint::from)
                .collect::<Vec<Mint32<998244353>>>(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter(|| black_box(&f).inv(n));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ntt_convolution,
    bench_arbitrary_convolution,
    bench_series_inverse
);
criterion_main!(benches);
