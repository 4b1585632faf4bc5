use criterion::{Criterion, black_box, criterion_group, criterion_main};
use duck_core::model::{N_FEATURES, builtin_forest};
use duck_core::{Channel, ChannelSpec, FeatureBasis, FeatureEngine, PhysicalBound, Reading, Standardizer};

// Deterministic pseudo-random feature rows
fn synth_rows(n: usize, seed: u32) -> Vec<[f32; N_FEATURES]> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x as f32) / (u32::MAX as f32 + 1.0) * 4.0 - 2.0
    };
    (0..n)
        .map(|_| std::array::from_fn(|_| next()))
        .collect()
}

fn bench_predict(c: &mut Criterion) {
    let forest = builtin_forest().expect("bundled model");
    let rows = synth_rows(1024, 0xDEC0);
    c.bench_function("forest_predict_1024", |b| {
        b.iter(|| {
            let mut ones = 0u32;
            for row in &rows {
                ones += u32::from(forest.predict(black_box(row)).0);
            }
            black_box(ones)
        })
    });
}

fn bench_derive(c: &mut Criterion) {
    let specs = [Channel::Temperature, Channel::Humidity, Channel::Pressure]
        .into_iter()
        .map(|channel| ChannelSpec {
            channel,
            bound: PhysicalBound {
                min: f32::MIN,
                max: f32::MAX,
            },
            scaler: Standardizer { mean: 0.0, std: 1.0 },
        })
        .collect::<Vec<_>>();
    c.bench_function("feature_derive", |b| {
        let mut engine = FeatureEngine::new(specs.clone(), 5, FeatureBasis::Raw);
        let mut ts = 0u64;
        b.iter(|| {
            ts += 10_000;
            let r = Reading {
                timestamp_ms: ts,
                temperature: 20.0 + (ts % 7) as f32,
                humidity: 40.0,
                pressure: 95_000.0,
                gas: None,
            };
            black_box(engine.derive(black_box(&r)))
        })
    });
}

criterion_group!(benches, bench_predict, bench_derive);
criterion_main!(benches);
