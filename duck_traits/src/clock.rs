use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for sampling cadence and retry delays.
///
/// - now(): returns a monotonic Instant
/// - sleep(): blocks the calling task only (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an epoch Instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Inner {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    /// Deterministic clock whose time only moves when told to.
    ///
    /// now() = origin + offset
    /// sleep(d) advances internal time by d without actually sleeping and
    /// records the request so tests can assert on retry delays.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        inner: Arc<Mutex<Inner>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                inner: Arc::new(Mutex::new(Inner::default())),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut g) = self.inner.lock() {
                g.offset = g.offset.saturating_add(d);
            }
        }

        /// Set the absolute offset relative to origin.
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut g) = self.inner.lock() {
                g.offset = d;
            }
        }

        /// Every duration passed to `sleep`, in call order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.inner
                .lock()
                .map(|g| g.sleeps.clone())
                .unwrap_or_default()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            let off = self.inner.lock().map(|g| g.offset).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut g) = self.inner.lock() {
                g.sleeps.push(d);
                g.offset = g.offset.saturating_add(d);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleep_advances_without_blocking() {
            let clock = ManualClock::new();
            let epoch = clock.now();
            clock.sleep(Duration::from_millis(1500));
            clock.advance(Duration::from_millis(500));
            assert_eq!(clock.ms_since(epoch), 2000);
            assert_eq!(clock.sleeps(), vec![Duration::from_millis(1500)]);
        }

        #[test]
        fn clones_share_time() {
            let a = ManualClock::new();
            let b = a.clone();
            let epoch = a.now();
            b.advance(Duration::from_secs(3));
            assert_eq!(a.ms_since(epoch), 3000);
        }
    }
}
