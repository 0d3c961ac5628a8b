//! Metrics module - compute latency and loop jitter tracking

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TIMING METRICS - Thread-safe performance tracking
// ============================================================================

#[derive(Clone)]
pub struct TimingMetrics {
    compute_hist: Arc<Mutex<Histogram<u64>>>,
    // Jitter tracking (variance in cycle period)
    last_cycle_time_ns: Arc<AtomicU64>,
    jitter_hist: Arc<Mutex<Histogram<u64>>>,
    overruns: Arc<AtomicU64>,
}

fn new_histogram() -> Arc<Mutex<Histogram<u64>>> {
    // Three significant figures is always within the supported 0..=5 range
    Arc::new(Mutex::new(
        Histogram::new(3).expect("3 significant figures is a valid precision"),
    ))
}

impl TimingMetrics {
    pub fn new() -> Self {
        Self {
            compute_hist: new_histogram(),
            last_cycle_time_ns: Arc::new(AtomicU64::new(0)),
            jitter_hist: new_histogram(),
            overruns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records how long one `compute` call took; counts an overrun when it
    /// exceeds `deadline`.
    pub fn record_compute(&self, duration: Duration, deadline: Duration) {
        self.compute_hist.lock().record(duration.as_nanos() as u64).ok();
        if duration > deadline {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record jitter (variation between consecutive cycle periods)
    pub fn record_cycle_jitter(&self, cycle_duration: Duration) {
        let cycle_ns = cycle_duration.as_nanos() as u64;
        let last = self.last_cycle_time_ns.swap(cycle_ns, Ordering::Relaxed);
        if last > 0 {
            self.jitter_hist.lock().record(cycle_ns.abs_diff(last)).ok();
        }
    }

    pub fn report(&self) -> MetricsReport {
        let compute = self.compute_hist.lock();
        let jitter = self.jitter_hist.lock();

        MetricsReport {
            compute_count: compute.len(),
            compute_p50: Duration::from_nanos(compute.value_at_quantile(0.5)),
            compute_p99: Duration::from_nanos(compute.value_at_quantile(0.99)),
            compute_max: Duration::from_nanos(compute.max()),
            jitter_p50: Duration::from_nanos(jitter.value_at_quantile(0.5)),
            jitter_p99: Duration::from_nanos(jitter.value_at_quantile(0.99)),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub compute_count: u64,
    pub compute_p50: Duration,
    pub compute_p99: Duration,
    pub compute_max: Duration,
    pub jitter_p50: Duration,
    pub jitter_p99: Duration,
    pub overruns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_overruns_past_deadline() {
        let metrics = TimingMetrics::new();
        let deadline = Duration::from_micros(100);

        metrics.record_compute(Duration::from_micros(10), deadline);
        metrics.record_compute(Duration::from_micros(500), deadline);

        let report = metrics.report();
        assert_eq!(report.compute_count, 2);
        assert_eq!(report.overruns, 1);
        assert!(report.compute_max >= Duration::from_micros(499));
    }

    #[test]
    fn first_cycle_sets_jitter_baseline() {
        let metrics = TimingMetrics::new();
        metrics.record_cycle_jitter(Duration::from_millis(10));
        assert_eq!(metrics.report().jitter_p99, Duration::ZERO);

        metrics.record_cycle_jitter(Duration::from_millis(12));
        let jitter = metrics.report().jitter_p99;
        assert!(jitter >= Duration::from_micros(1990) && jitter <= Duration::from_micros(2010));
    }
}
