//! Background sensor sampling.
//!
//! Spawns a thread that owns the `EnvSensor`, reads on a fixed cadence
//! through the retry policy and pushes timestamped readings over a bounded
//! channel. When the consumer falls behind, readings are dropped and
//! `QueueFull` is reported instead of blocking the sampling task.
//!
//! Each `Sampler` spawns exactly one thread that is shut down and joined
//! when the `Sampler` is dropped.
use crossbeam_channel as xch;
use duck_traits::EnvSensor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::SamplerCfg;
use crate::features::Reading;
use crate::hw_error::map_hw_error;
use crate::retry::RetryPolicy;
use crate::status::StatusKind;

/// Longest single sleep between shutdown checks.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

pub struct Sampler {
    rx: xch::Receiver<Reading>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    pub fn spawn<S: EnvSensor + Send + 'static>(
        mut sensor: S,
        cfg: SamplerCfg,
        retry: RetryPolicy,
    ) -> Self {
        let (tx, rx) = xch::bounded(cfg.queue_depth.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let clock = retry.clock().clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                let read = retry.retry("sensor read", StatusKind::SensorRead, || {
                    sensor
                        .read(cfg.sensor_timeout)
                        .map_err(|e| map_hw_error(e.as_ref()))
                });
                if let Ok(m) = read {
                    let now = clock.ms_since(epoch);
                    match tx.try_send(Reading::from_measurement(m, now)) {
                        Ok(()) => last_ok_clone.store(now, Ordering::Relaxed),
                        Err(xch::TrySendError::Full(_)) => {
                            retry
                                .state()
                                .report(StatusKind::QueueFull, Some("sensor queue full"));
                        }
                        Err(xch::TrySendError::Disconnected(_)) => {
                            tracing::debug!("sampler consumer disconnected, exiting thread");
                            break;
                        }
                    }
                }

                // Sleep in slices so drop is not held up by a long cadence.
                let mut remaining = cfg.interval;
                while !remaining.is_zero() && !shutdown_clone.load(Ordering::Relaxed) {
                    let slice = remaining.min(SHUTDOWN_POLL);
                    clock.sleep(slice);
                    remaining = remaining.saturating_sub(slice);
                }
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn receiver(&self) -> &xch::Receiver<Reading> {
        &self.rx
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Reading> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Most recent queued reading, discarding older ones.
    pub fn latest(&self) -> Option<Reading> {
        self.rx.try_iter().last()
    }

    /// Timestamp of the last reading handed to the queue.
    pub fn last_ok_ms(&self) -> u64 {
        self.last_ok.load(Ordering::Relaxed)
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads, after an in-flight read (bounded
        // by the sensor timeout and retry delays) or within one sleep slice.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("sampler thread joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}
