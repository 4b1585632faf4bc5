//! Sampler thread lifecycle: readings flow, overflow is reported, drop joins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use duck_core::mocks::ScriptedSensor;
use duck_core::{ErrorState, RetryPolicy, SamplerCfg, Sampler, StatusKind};
use duck_traits::Measurement;
use duck_traits::clock::MonotonicClock;
use duck_traits::clock::test_clock::ManualClock;

fn m(t: f32) -> Measurement {
    Measurement {
        temperature: t,
        humidity: 40.0,
        pressure: 95_000.0,
        gas: Some(80_000.0),
    }
}

fn policy(state: Arc<ErrorState>) -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(1), Arc::new(MonotonicClock::new()), state)
}

fn cfg(interval_ms: u64, queue_depth: usize) -> SamplerCfg {
    SamplerCfg {
        interval: Duration::from_millis(interval_ms),
        sensor_timeout: Duration::from_millis(10),
        queue_depth,
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn readings_arrive_in_order() {
    let state = Arc::new(ErrorState::new());
    let sensor = ScriptedSensor::new(vec![Ok(m(20.0)), Ok(m(21.0)), Ok(m(22.0))]);
    let sampler = Sampler::spawn(sensor, cfg(5, 8), policy(state.clone()));

    let a = sampler.recv_timeout(Duration::from_secs(5)).unwrap();
    let b = sampler.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(a.temperature, 20.0);
    assert_eq!(b.temperature, 21.0);
    assert!(b.timestamp_ms >= a.timestamp_ms);
    drop(sampler);
    assert!(!state.is_error());
}

#[test]
fn failed_reads_are_retried_then_reported() {
    let state = Arc::new(ErrorState::new());
    let sensor = ScriptedSensor::new(vec![Err("nack".into())]);
    let sampler = Sampler::spawn(sensor, cfg(5, 8), policy(state.clone()));
    assert!(wait_for(|| state.current_status() == StatusKind::SensorRead));
    assert!(sampler.latest().is_none());
}

#[test]
fn full_queue_reports_instead_of_blocking() {
    let state = Arc::new(ErrorState::new());
    let clock = ManualClock::new();
    let retry = RetryPolicy::new(1, Duration::ZERO, Arc::new(clock), state.clone());
    let sampler = Sampler::spawn(ScriptedSensor::constant(m(20.0)), cfg(1, 1), retry);
    assert!(wait_for(|| state.current_status() == StatusKind::QueueFull));
    // Drop must not hang on a full queue.
    drop(sampler);
}

#[test]
fn drop_returns_promptly_with_long_cadence() {
    let state = Arc::new(ErrorState::new());
    let sampler = Sampler::spawn(
        ScriptedSensor::constant(m(20.0)),
        cfg(60_000, 1),
        policy(state),
    );
    assert!(sampler.recv_timeout(Duration::from_secs(5)).is_some());
    let start = Instant::now();
    drop(sampler);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn multiple_samplers_dont_leak_threads() {
    for _ in 0..10 {
        let state = Arc::new(ErrorState::new());
        let sampler = Sampler::spawn(ScriptedSensor::constant(m(20.0)), cfg(5, 2), policy(state));
        std::thread::sleep(Duration::from_millis(10));
        let _ = sampler.latest();
        drop(sampler);
    }
}
