use std::time::Duration;

use duck_hardware::error::HwError;
use duck_hardware::{SimulatedEnvSensor, SimulatedGps};
use duck_traits::{EnvSensor, GpsSource, Measurement};
use rstest::rstest;

fn base() -> Measurement {
    Measurement {
        temperature: 20.0,
        humidity: 40.0,
        pressure: 95_000.0,
        gas: Some(80_000.0),
    }
}

#[test]
fn readings_stay_near_base() {
    let mut s = SimulatedEnvSensor::new(base()).with_step(0.1);
    for _ in 0..50 {
        let m = s.read(Duration::from_millis(10)).unwrap();
        assert!((18.0..=22.0).contains(&m.temperature), "{m:?}");
        assert!(m.gas.is_some());
    }
}

#[test]
fn same_sequence_every_time() {
    let mut a = SimulatedEnvSensor::new(base());
    let mut b = SimulatedEnvSensor::new(base());
    for _ in 0..10 {
        assert_eq!(
            a.read(Duration::ZERO).unwrap(),
            b.read(Duration::ZERO).unwrap()
        );
    }
}

#[rstest]
#[case(1)]
#[case(3)]
fn injected_failures_are_timeouts(#[case] n: u32) {
    let mut s = SimulatedEnvSensor::new(base()).with_failures(n);
    let mut failures = 0;
    for _ in 0..6 {
        if let Err(e) = s.read(Duration::ZERO) {
            assert!(matches!(e.downcast_ref::<HwError>(), Some(HwError::Timeout)));
            failures += 1;
        }
    }
    assert_eq!(failures, 6 / n);
}

#[test]
fn gps_fix_after_warmup() {
    let mut g = SimulatedGps::new(2).with_sentence("$FIX");
    assert_eq!(g.read_fix(Duration::ZERO).unwrap(), None);
    assert_eq!(g.read_fix(Duration::ZERO).unwrap(), None);
    assert_eq!(g.read_fix(Duration::ZERO).unwrap().as_deref(), Some("$FIX"));
}
