use duck_core::model::{N_FEATURES, builtin_forest};
use duck_core::{
    Channel, ChannelSpec, FeatureBasis, FeatureEngine, History, PhysicalBound, Reading,
    Standardizer,
};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f32> {
    -1.0e4f32..1.0e4f32
}

proptest! {
    #[test]
    fn history_never_exceeds_capacity(cap in 1usize..16, values in prop::collection::vec(finite(), 0..64)) {
        let mut h = History::new(cap);
        for v in &values {
            h.push(*v);
            prop_assert!(h.len() <= cap);
        }
        let expected: Vec<f32> = values.iter().rev().take(cap).rev().copied().collect();
        prop_assert_eq!(h.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn mean_counts_empty_slots_as_zero(cap in 1usize..16, values in prop::collection::vec(finite(), 1..16)) {
        let mut h = History::new(cap);
        for v in &values {
            h.push(*v);
        }
        let held: f64 = h.iter().map(f64::from).sum();
        let expected = (held / cap as f64) as f32;
        prop_assert!((h.mean() - expected).abs() <= 1e-3 * expected.abs().max(1.0));
        prop_assert!(h.volatility() >= 0.0 && h.volatility().is_finite());
    }

    #[test]
    fn forest_is_total_and_deterministic(x in prop::collection::vec(
        prop_oneof![finite(), Just(f32::NAN), Just(f32::INFINITY), Just(f32::NEG_INFINITY)],
        N_FEATURES,
    )) {
        let forest = builtin_forest().unwrap();
        let label = forest.predict(&x);
        prop_assert!(label.0 < forest.n_classes());
        prop_assert_eq!(forest.predict(&x), label);
        let total: u32 = forest.votes(&x).iter().map(|&v| u32::from(v)).sum();
        prop_assert_eq!(total, 10);
    }

    #[test]
    fn velocity_is_finite_for_increasing_timestamps(
        temps in prop::collection::vec(-40.0f32..85.0, 2..20),
        step_ms in 1u64..600_000,
    ) {
        let mut e = FeatureEngine::new(
            vec![ChannelSpec {
                channel: Channel::Temperature,
                bound: PhysicalBound { min: -40.0, max: 85.0 },
                scaler: Standardizer { mean: 22.6, std: 9.1 },
            }],
            5,
            FeatureBasis::Raw,
        );
        for (i, t) in temps.iter().enumerate() {
            let fv = e.derive(&Reading {
                timestamp_ms: i as u64 * step_ms,
                temperature: *t,
                humidity: 0.0,
                pressure: 0.0,
                gas: None,
            });
            let c = fv.get(Channel::Temperature).unwrap();
            prop_assert!(c.velocity.is_finite());
            if i == 0 {
                prop_assert_eq!(c.velocity, 0.0);
            }
        }
    }
}
