use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Millisecond time source read by the controller once per `compute` call.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Any `Fn() -> i64` closure works as a clock.
impl<F> Clock for F
where
    F: Fn() -> i64,
{
    fn now_ms(&self) -> i64 {
        self()
    }
}

/// Wall clock in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same underlying time, so a test (or a simulation) can keep
/// one handle while the controller owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }

    pub fn advance_by(&self, delta: Duration) {
        self.advance(delta.as_millis() as i64);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();

        handle.advance(50);
        assert_eq!(clock.now_ms(), 150);

        handle.advance_by(Duration::from_secs(1));
        assert_eq!(clock.now_ms(), 1150);

        clock.set(7);
        assert_eq!(handle.now_ms(), 7);
    }

    #[test]
    fn closures_are_clocks() {
        let fixed = || 42_i64;
        assert_eq!(fixed.now_ms(), 42);
    }

    #[test]
    fn system_clock_is_past_epoch() {
        // Any real host is far past one day after the epoch.
        assert!(SystemClock.now_ms() > 86_400_000);
    }
}
