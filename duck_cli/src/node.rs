//! Node assembly on simulated peripherals and the subcommand bodies.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use duck_config::{ChannelKey, Config};
use duck_core::error::{DuckError, Result};
use duck_core::hw_error::map_hw_error;
use duck_core::model::{MODEL_CHANNELS, N_FEATURES, builtin_forest};
use duck_core::{
    ErrorState, GpsCfg, HealthCfg, ModelError, NodeRunner, PipelineCfg, Reading, RetryCfg,
    RetryPolicy, RunSummary, Sampler, SamplerCfg, StatusKind, builtin_pipeline,
};
use duck_hardware::{FixedStackProbe, SimulatedEnvSensor, SimulatedGps};
use duck_traits::{Clock, EnvSensor, Measurement, MonotonicClock};
use eyre::WrapErr;
use serde_json::json;

/// Simulated reads before the GPS reports a fix.
const GPS_WARMUP_READS: u32 = 1;

/// Simulated sensor centred on the active calibration means, so readings sit
/// inside the profile's bounds.
fn simulated_sensor(cfg: &Config, fail_every: u32) -> SimulatedEnvSensor {
    let mean = |k: ChannelKey| cfg.channel_calibration(k).map_or(0.0, |c| c.mean);
    let gas = cfg
        .channels()
        .contains(&ChannelKey::Gas)
        .then(|| mean(ChannelKey::Gas));
    SimulatedEnvSensor::new(Measurement {
        temperature: mean(ChannelKey::Temperature),
        humidity: mean(ChannelKey::Humidity),
        pressure: mean(ChannelKey::Pressure),
        gas,
    })
    .with_failures(fail_every)
}

fn pipeline_cfg(cfg: &Config) -> Result<PipelineCfg> {
    Ok(PipelineCfg::try_from(cfg)?)
}

fn retry_policy(cfg: &Config, state: &Arc<ErrorState>) -> RetryPolicy {
    let rc = RetryCfg::from(&cfg.system);
    RetryPolicy::new(
        rc.max_attempts,
        rc.delay,
        Arc::new(MonotonicClock::new()),
        state.clone(),
    )
}

/// Simulated ML-task headroom: half the configured stack.
fn stack_probe(cfg: &Config) -> FixedStackProbe {
    FixedStackProbe(cfg.tasks.ml_stack_size / 2)
}

pub fn run_node(
    cfg: &Config,
    cycles: Option<u64>,
    interval_ms: Option<u64>,
    fail_every: u32,
    shutdown: &AtomicBool,
) -> Result<RunSummary> {
    let state = Arc::new(ErrorState::new());
    let pipeline = builtin_pipeline(&pipeline_cfg(cfg)?, state.clone())?;
    let retry = retry_policy(cfg, &state);

    let mut scfg = SamplerCfg::from(&cfg.system);
    if let Some(ms) = interval_ms {
        scfg.interval = Duration::from_millis(ms);
    }
    tracing::info!(
        profile = ?cfg.profile,
        interval_ms = scfg.interval.as_millis() as u64,
        ?cycles,
        "starting node"
    );

    let sampler = Sampler::spawn(simulated_sensor(cfg, fail_every), scfg, retry.clone());
    let mut runner = NodeRunner::new(
        pipeline,
        retry,
        HealthCfg::from(&cfg.tasks),
        Box::new(stack_probe(cfg)),
    )
    .with_gps(
        Box::new(SimulatedGps::new(GPS_WARMUP_READS)),
        GpsCfg::from(&cfg.system),
    );

    let stdout = std::io::stdout();
    let summary = runner.run(sampler.receiver(), shutdown, cycles, |record| {
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, record).wrap_err("serialize record")?;
        writeln!(out).wrap_err("write record")?;
        out.flush().wrap_err("flush stdout")?;
        Ok(())
    })?;
    drop(sampler);

    let status = state.snapshot();
    if status.kind != StatusKind::Ok {
        tracing::warn!(kind = %status.kind, message = %status.message, "node finished with status");
    }
    Ok(summary)
}

pub fn classify(features: &[f32], json_mode: bool) -> Result<()> {
    if features.len() != N_FEATURES {
        return Err(DuckError::Model(ModelError::InputWidth {
            expected: N_FEATURES,
            got: features.len(),
        })
        .into());
    }
    let forest = builtin_forest().map_err(DuckError::from)?;
    let votes = forest.votes(features);
    let label = forest.predict(features);
    if json_mode {
        println!("{}", json!({ "label": label, "votes": votes }));
    } else {
        println!("label {} votes {:?}", label.0, votes);
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json_mode: bool) -> Result<()> {
    let state = Arc::new(ErrorState::new());
    let mut pipeline = builtin_pipeline(&pipeline_cfg(cfg)?, state)?;
    let mut sensor = simulated_sensor(cfg, 0);
    let m = sensor
        .read(Duration::from_millis(cfg.system.sensor_timeout_ms))
        .map_err(|e| map_hw_error(e.as_ref()))?;
    let record = pipeline
        .process(&Reading::from_measurement(m, 0))
        .map_err(DuckError::from)?;
    let channels: Vec<_> = cfg.channels().iter().map(|k| k.as_str()).collect();
    tracing::debug!(prediction = record.prediction.0, "self-check reading classified");
    if json_mode {
        println!(
            "{}",
            json!({
                "status": "ok",
                "channels": channels,
                "model_channels": MODEL_CHANNELS,
                "trees": pipeline.forest().n_trees(),
            })
        );
    } else {
        println!("ok");
    }
    Ok(())
}

/// Read the sensor once through the retry policy, check stack headroom and
/// print the resulting status. A failed read is returned after printing.
pub fn health(cfg: &Config, fail_every: u32, json_mode: bool) -> Result<()> {
    let state = Arc::new(ErrorState::new());
    let retry = retry_policy(cfg, &state);
    let clock = MonotonicClock::new();
    let epoch = clock.now();
    let mut sensor = simulated_sensor(cfg, fail_every);
    let timeout = Duration::from_millis(cfg.system.sensor_timeout_ms);

    let read = retry.retry("sensor read", StatusKind::SensorRead, || {
        sensor.read(timeout).map_err(|e| map_hw_error(e.as_ref()))
    });
    let reading = read
        .as_ref()
        .ok()
        .map(|m| Reading::from_measurement(*m, clock.ms_since(epoch)));

    let monitor = duck_core::HealthMonitor::new(state.clone());
    let stack = monitor.check_stack_health(
        &stack_probe(cfg),
        duck_core::runner::INFERENCE_TASK,
        cfg.tasks.min_stack_watermark,
    );

    let snap = state.snapshot();
    if json_mode {
        println!(
            "{}",
            json!({ "status": snap, "stack": stack, "reading": reading })
        );
    } else {
        println!("status: {}", snap.kind);
        if !snap.message.is_empty() {
            println!("message: {}", snap.message);
        }
        println!(
            "stack: {} {}B (min {}B)",
            stack.task, stack.high_water_mark, stack.min_watermark
        );
    }
    read.map(|_| ()).map_err(Into::into)
}
