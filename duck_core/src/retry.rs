//! Bounded retries with a fixed, injectable delay.
//!
//! The delay is a blocking `Clock::sleep` on the calling thread only. A hung
//! operation is not preempted here; each operation enforces its own timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use duck_traits::Clock;

use crate::error::DuckError;
use crate::status::{ErrorState, StatusKind};

/// Outcome notifications for observers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// `attempt` of `max_attempts` failed and another try follows.
    AttemptFailed {
        operation: String,
        attempt: u8,
        max_attempts: u8,
    },
    /// Succeeded after `retries` failed attempts (never emitted for a first-try success).
    Recovered { operation: String, retries: u8 },
    /// Every attempt failed.
    Exhausted {
        operation: String,
        kind: StatusKind,
        attempts: u8,
    },
}

pub type RetryObserver = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u8,
    delay: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
    state: Arc<ErrorState>,
    observer: Option<RetryObserver>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u8,
        delay: Duration,
        clock: Arc<dyn Clock + Send + Sync>,
        state: Arc<ErrorState>,
    ) -> Self {
        Self {
            max_attempts,
            delay,
            clock,
            state,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn state(&self) -> &Arc<ErrorState> {
        &self.state
    }

    /// Run a sensor-read style operation with the configured attempt count.
    pub fn attempt(&self, operation: &str, op: impl FnMut() -> bool) -> bool {
        self.attempt_as(operation, StatusKind::SensorRead, self.max_attempts, op)
    }

    /// Run `op` up to `max_attempts` times, recording `kind` on exhaustion.
    pub fn attempt_as(
        &self,
        operation: &str,
        kind: StatusKind,
        max_attempts: u8,
        mut op: impl FnMut() -> bool,
    ) -> bool {
        self.run(operation, kind, max_attempts, || {
            if op() { Ok(()) } else { Err("operation returned false") }
        })
        .is_ok()
    }

    /// Value-returning variant; the last error text is carried in
    /// [`DuckError::RetryExhausted`].
    pub fn retry<T, E: fmt::Display>(
        &self,
        operation: &str,
        kind: StatusKind,
        op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, DuckError> {
        self.run(operation, kind, self.max_attempts, op)
    }

    fn run<T, E: fmt::Display>(
        &self,
        operation: &str,
        kind: StatusKind,
        max_attempts: u8,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, DuckError> {
        let mut last_error = String::from("no attempts allowed");
        for attempt in 1..=max_attempts {
            match op() {
                Ok(v) => {
                    if attempt > 1 {
                        let retries = attempt - 1;
                        tracing::info!(operation, retries, "operation recovered after retries");
                        self.emit(RetryEvent::Recovered {
                            operation: operation.to_owned(),
                            retries,
                        });
                    }
                    return Ok(v);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        tracing::warn!(
                            operation,
                            attempt,
                            max_attempts,
                            error = %last_error,
                            "attempt failed"
                        );
                        self.emit(RetryEvent::AttemptFailed {
                            operation: operation.to_owned(),
                            attempt,
                            max_attempts,
                        });
                        self.clock.sleep(self.delay);
                    }
                }
            }
        }

        tracing::error!(operation, attempts = max_attempts, %kind, "retries exhausted");
        let message = format!("{operation} failed after {max_attempts} attempts");
        self.state.report(kind, Some(&message));
        self.emit(RetryEvent::Exhausted {
            operation: operation.to_owned(),
            kind,
            attempts: max_attempts,
        });
        Err(DuckError::RetryExhausted {
            operation: operation.to_owned(),
            kind,
            attempts: max_attempts,
            last_error,
        })
    }

    fn emit(&self, event: RetryEvent) {
        if let Some(obs) = &self.observer {
            obs(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duck_traits::clock::test_clock::ManualClock;
    use std::sync::Mutex;

    fn policy(max: u8) -> (RetryPolicy, ManualClock, Arc<ErrorState>) {
        let clock = ManualClock::new();
        let state = Arc::new(ErrorState::new());
        let p = RetryPolicy::new(
            max,
            Duration::from_millis(1000),
            Arc::new(clock.clone()),
            state.clone(),
        );
        (p, clock, state)
    }

    #[test]
    fn first_try_success_does_not_sleep_or_emit() {
        let (p, clock, state) = policy(3);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let p = p.with_observer(Arc::new(move |e: &RetryEvent| {
            sink.lock().unwrap().push(e.clone());
        }));
        assert!(p.attempt("read", || true));
        assert!(clock.sleeps().is_empty());
        assert!(events.lock().unwrap().is_empty());
        assert!(!state.is_error());
    }

    #[test]
    fn sleeps_only_between_attempts() {
        let (p, clock, _) = policy(3);
        assert!(!p.attempt("read", || false));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(1000); 2]);
    }

    #[test]
    fn zero_attempts_never_calls_and_records_failure() {
        let (p, _, state) = policy(0);
        let mut calls = 0;
        assert!(!p.attempt("read", || {
            calls += 1;
            true
        }));
        assert_eq!(calls, 0);
        assert_eq!(state.current_status(), StatusKind::SensorRead);
    }

    #[test]
    fn retry_carries_last_error() {
        let (p, _, _) = policy(2);
        let mut n = 0;
        let err = p
            .retry("gps", StatusKind::GpsTimeout, || -> Result<(), String> {
                n += 1;
                Err(format!("fail {n}"))
            })
            .unwrap_err();
        match err {
            DuckError::RetryExhausted {
                kind,
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(kind, StatusKind::GpsTimeout);
                assert_eq!(attempts, 2);
                assert_eq!(last_error, "fail 2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
