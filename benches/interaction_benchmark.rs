use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rmst_interactions::distributor::{Distributor, DistributorConfig, FeaturePair};
use rmst_interactions::{KaplanMeierCurve, SurvivalData, compute_interactions, median_split_rmst};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

fn generate_synthetic_data(n_samples: usize, n_features: usize) -> SurvivalData {
    let mut rng = StdRng::seed_from_u64(42);

    let columns: Vec<(String, Vec<f64>)> = (0..n_features)
        .map(|j| {
            let values = (0..n_samples).map(|_| rng.gen_range(-2.0..2.0)).collect();
            (format!("g{}", j), values)
        })
        .collect();

    let mut times = Vec::with_capacity(n_samples);
    let mut events = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let hazard = (0.5 * columns[0].1[i]).exp();
        let u: f64 = rng.gen_range(1e-6..1.0);
        let time = -u.ln() / (0.1 * hazard);
        let censoring_time = rng.gen_range(1.0..8.0);

        if time < censoring_time {
            times.push(time);
            events.push(true);
        } else {
            times.push(censoring_time);
            events.push(false);
        }
    }

    SurvivalData::from_columns(times, events, columns).unwrap()
}

fn benchmark_kaplan_meier(c: &mut Criterion) {
    let mut group = c.benchmark_group("kaplan_meier");

    for &n_samples in [100, 500, 2000].iter() {
        let data = generate_synthetic_data(n_samples, 1);
        let indicator: Vec<bool> = (0..n_samples).map(|i| i % 2 == 0).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_samples", n_samples)),
            &n_samples,
            |b, _| {
                b.iter(|| KaplanMeierCurve::fit(black_box(&indicator), black_box(data.events())).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_median_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_split");

    for &n_samples in [100, 500, 2000].iter() {
        let data = generate_synthetic_data(n_samples, 1);
        let time_limit = data.time_limit(75.0).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_samples", n_samples)),
            &n_samples,
            |b, _| {
                b.iter(|| {
                    median_split_rmst(
                        black_box(data.feature("g0").unwrap()),
                        data.times(),
                        data.events(),
                        time_limit,
                    )
                    .unwrap()
                });
            },
        );
    }
    group.finish();
}

fn benchmark_pair_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_scoring");

    let data = generate_synthetic_data(500, 2);
    group.bench_function("500_samples", |b| {
        b.iter(|| {
            compute_interactions(
                black_box(data.feature("g0").unwrap()),
                black_box(data.feature("g1").unwrap()),
                data.times(),
                data.events(),
            )
            .unwrap()
        });
    });

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);

    let data = generate_synthetic_data(500, 20);
    let mut pairs = Vec::new();
    for i in 0..20 {
        for j in (i + 1)..20 {
            pairs.push(FeaturePair::new(format!("g{}", i), format!("g{}", j)));
        }
    }

    for &threads in [1, 4].iter() {
        let distributor = Distributor::new(DistributorConfig::new().with_threads(threads)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_pairs_{}_threads", pairs.len(), threads)),
            &threads,
            |b, _| {
                b.iter(|| distributor.run(black_box(&data), &pairs).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_kaplan_meier,
    benchmark_median_split,
    benchmark_pair_scoring,
    benchmark_batch
);
criterion_main!(benches);
