#![no_main]
use std::sync::Arc;

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Sample {
    dt_ms: u32,
    temperature: f32,
    humidity: f32,
    pressure: f32,
    gas: Option<f32>,
}

fuzz_target!(|samples: Vec<Sample>| {
    let cfg = duck_config::Config::default();
    let Ok(pcfg) = duck_core::PipelineCfg::try_from(&cfg) else {
        return;
    };
    let state = Arc::new(duck_core::ErrorState::new());
    let Ok(mut pipeline) = duck_core::builtin_pipeline(&pcfg, state) else {
        return;
    };
    let mut ts = 0u64;
    for s in samples {
        ts = ts.saturating_add(u64::from(s.dt_ms));
        let reading = duck_core::Reading {
            timestamp_ms: ts,
            temperature: s.temperature,
            humidity: s.humidity,
            pressure: s.pressure,
            gas: s.gas,
        };
        if let Ok(record) = pipeline.process(&reading) {
            assert!(record.prediction.0 < 2);
        }
    }
});
