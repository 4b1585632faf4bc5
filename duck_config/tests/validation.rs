use duck_config::{ChannelKey, FeatureBasis, HardwareRevision, load_toml};
use rstest::rstest;

#[test]
fn empty_config_uses_v6_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.profile, HardwareRevision::V6);
    assert_eq!(cfg.system.max_retry_count, 3);
    assert_eq!(cfg.system.history_window, 5);
    assert_eq!(cfg.feature_basis(), FeatureBasis::Raw);
    assert_eq!(cfg.channels().len(), 4);
}

#[test]
fn v4_profile_has_three_channels_and_scaled_basis() {
    let cfg = load_toml("profile = \"v4\"").expect("parse TOML");
    cfg.validate().expect("v4 should pass");
    assert_eq!(
        cfg.channels(),
        vec![
            ChannelKey::Temperature,
            ChannelKey::Humidity,
            ChannelKey::Pressure
        ]
    );
    assert_eq!(cfg.feature_basis(), FeatureBasis::Scaled);
    let p = cfg.bound(ChannelKey::Pressure).unwrap();
    assert_eq!((p.min, p.max), (300.0, 1100.0));
}

#[test]
fn toml_overrides_profile_per_channel() {
    let toml = r#"
profile = "v5"

[features]
basis = "scaled"
use_gas = false

[bounds.temperature]
min = -20.0
max = 60.0

[calibration.humidity]
mean = 50.0
std = 10.0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid overrides");
    assert_eq!(cfg.feature_basis(), FeatureBasis::Scaled);
    assert!(!cfg.channels().contains(&ChannelKey::Gas));
    let t = cfg.bound(ChannelKey::Temperature).unwrap();
    assert_eq!((t.min, t.max), (-20.0, 60.0));
    let h = cfg.channel_calibration(ChannelKey::Humidity).unwrap();
    assert_eq!((h.mean, h.std), (50.0, 10.0));
    // untouched channel keeps the v5 constant
    let p = cfg.channel_calibration(ChannelKey::Pressure).unwrap();
    assert!((p.mean - 97_206.945).abs() < 0.1);
}

#[rstest]
#[case("[system]\nmax_retry_count = 0", "max_retry_count must be >= 1")]
#[case("[system]\nhistory_window = 0", "history_window must be >= 1")]
#[case("[system]\nread_interval_ms = 0", "read_interval_ms must be >= 1")]
#[case("[system]\ngps_buffer_size = 1", "gps_buffer_size must be >= 2")]
#[case(
    "[tasks]\nml_stack_size = 1024\nmin_stack_watermark = 2048",
    "min_stack_watermark must be < tasks.ml_stack_size"
)]
#[case("[bounds.humidity]\nmin = 100.0\nmax = 0.0", "bounds.humidity.min must be <= max")]
#[case("[calibration.gas]\nmean = 1.0\nstd = 0.0", "calibration.gas.std must be > 0")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(expected),
        "unexpected error: {err}"
    );
}

#[test]
fn disabled_gas_channel_is_not_validated() {
    let toml = r#"
profile = "v6"

[features]
use_gas = false

[calibration.gas]
mean = 1.0
std = -1.0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("gas is off, its calibration is irrelevant");
}

#[test]
fn unknown_profile_is_a_parse_error() {
    assert!(load_toml("profile = \"v9\"").is_err());
}
