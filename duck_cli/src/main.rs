#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `duck`: run and inspect a duck node's sensing pipeline on simulated hardware.

mod cli;
mod error_fmt;
mod node;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use duck_config::Config;
use duck_core::error::{DuckError, Result};
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::error!(error = %format!("{e:#}"), "exiting with error");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli)?;
    init_tracing(&cli, &cfg)?;
    tracing::debug!(profile = ?cfg.profile, channels = cfg.channels().len(), "config loaded");

    match cli.cmd {
        Commands::Run {
            cycles,
            interval_ms,
            fail_every,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;
            let summary = node::run_node(&cfg, cycles, interval_ms, fail_every, &shutdown)?;
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                "run finished"
            );
            Ok(())
        }
        Commands::Classify { features } => node::classify(&features, cli.json),
        Commands::SelfCheck => node::self_check(&cfg, cli.json),
        Commands::Health { fail_every } => node::health(&cfg, fail_every, cli.json),
    }
}

/// Read, merge calibration and validate. Every failure is a config error.
fn load_config(cli: &Cli) -> Result<Config> {
    let config_err = |e: eyre::Report| DuckError::Config(format!("{e:#}"));

    let path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => Some(Path::new(DEFAULT_CONFIG).to_path_buf()).filter(|p| p.exists()),
    };
    let mut cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(&p)
                .wrap_err_with(|| format!("read config {}", p.display()))
                .map_err(config_err)?;
            toml::from_str::<Config>(&text)
                .wrap_err_with(|| format!("parse config {}", p.display()))
                .map_err(config_err)?
        }
        None => Config::default(),
    };

    if let Some(csv) = &cli.calibration {
        let rows = duck_config::load_calibration_csv(csv).map_err(config_err)?;
        cfg.apply_calibration(&rows);
    }
    cfg.validate().map_err(config_err)?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, cfg: &Config) -> Result<()> {
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    // stdout carries records; logs go to stderr.
    let console = if cli.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = match &cfg.logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
            let dir = dir.unwrap_or_else(|| Path::new("."));
            let name = path.file_name().ok_or_else(|| {
                DuckError::Config(format!("logging.file '{}' has no file name", path.display()))
            })?;
            let appender = match cfg.logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("initialize tracing")?;
    Ok(())
}
