//! Human-readable error descriptions, exit codes and structured JSON errors.

use duck_core::error::DuckError;
use duck_core::{ModelError, StatusKind};

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_CONFIG: i32 = 3;
pub const EXIT_RETRY_EXHAUSTED: i32 = 4;
pub const EXIT_MODEL: i32 = 5;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(de) = err.downcast_ref::<DuckError>() {
        return match de {
            DuckError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or calibration CSV.\nHow to fix: Edit the config file, then rerun `duck self-check`."
            ),
            DuckError::RetryExhausted {
                operation,
                kind,
                attempts,
                last_error,
            } => {
                let hint = match kind {
                    StatusKind::SensorRead | StatusKind::Bme680Init => {
                        "Check the BME680 wiring and power, or raise system.sensor_timeout_ms."
                    }
                    StatusKind::GpsTimeout | StatusKind::GpsInit => {
                        "Check the GPS antenna and UART wiring, or raise system.gps_timeout_ms."
                    }
                    _ => "Raise system.max_retry_count or system.retry_delay_ms.",
                };
                format!(
                    "What happened: {operation} failed {attempts} times ({kind}). Last error: {last_error}.\nHow to fix: {hint}"
                )
            }
            DuckError::Model(ModelError::InputWidth { expected, got }) => format!(
                "What happened: The model takes {expected} features but {got} were given.\nHow to fix: Pass scaled, volatility and velocity values for temperature, humidity and pressure, in that order."
            ),
            DuckError::Model(me) => format!(
                "What happened: The bundled model table is invalid ({me}).\nHow to fix: Rebuild with an unmodified model."
            ),
            DuckError::Timeout => "What happened: Sensor read timed out.\nLikely causes: Sensor not wired correctly or timeout too low.\nHow to fix: Verify wiring and consider increasing system.sensor_timeout_ms.".to_string(),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'channel,mean,std'.".to_string();
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 config, 4 retry exhausted, 5 model, 1 anything else.
/// Usage errors exit with 2 from clap before any of this runs.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<DuckError>() {
        Some(DuckError::Config(_)) => EXIT_CONFIG,
        Some(DuckError::RetryExhausted { .. }) => EXIT_RETRY_EXHAUSTED,
        Some(DuckError::Model(_)) => EXIT_MODEL,
        _ => EXIT_GENERIC,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<DuckError>() {
        Some(DuckError::Config(_)) => "Config",
        Some(DuckError::RetryExhausted { .. }) => "RetryExhausted",
        Some(DuckError::Model(_)) => "Model",
        Some(DuckError::Validation(_)) => "Validation",
        Some(DuckError::Hardware(_)) => "Hardware",
        Some(DuckError::Timeout) => "Timeout",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(DuckError::RetryExhausted {
        operation,
        kind,
        attempts,
        ..
    }) = err.downcast_ref::<DuckError>()
    {
        obj["details"] = json!({ "operation": operation, "kind": kind, "attempts": attempts });
    }
    obj.to_string()
}
