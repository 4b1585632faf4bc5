#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not. A config that
    // validates must also map onto a pipeline.
    if let Ok(cfg) = duck_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let pcfg = duck_core::PipelineCfg::try_from(&cfg);
            assert!(pcfg.is_ok(), "validated config failed to map: {pcfg:?}");
        }
    }
});
