//! Control loop - one sample/compute/apply cycle shared by the threaded and async hosts

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::TrySendError;

use crate::config::LoopConfig;
use crate::ipc::{DiagnosticLog, LoopChannels, LoopSample, SharedController};
use crate::metrics::TimingMetrics;
use crate::pid::Clock;
use crate::sensor::{MovingAverage, SimulatedPlant};

// ============================================================================
// LOOP STATS - Counters readable while the loop runs
// ============================================================================

pub struct LoopStats {
    pub cycles: AtomicU64,
    pub dropped_samples: AtomicU64,
    pub shutdown: AtomicBool,
}

impl LoopStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cycles: AtomicU64::new(0),
            dropped_samples: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

// ============================================================================
// CONTROL CYCLE - Measure, compute, apply, report
// ============================================================================

pub struct ControlCycle<C: Clock> {
    controller: SharedController<C>,
    filter: MovingAverage,
    channels: LoopChannels,
    log: DiagnosticLog,
    metrics: TimingMetrics,
    stats: Arc<LoopStats>,
    interval: Duration,
    log_every: u64,
    cycle_id: u64,
}

impl<C: Clock> ControlCycle<C> {
    pub fn new(
        controller: SharedController<C>,
        channels: LoopChannels,
        log: DiagnosticLog,
        metrics: TimingMetrics,
        config: &LoopConfig,
    ) -> Self {
        Self {
            controller,
            filter: MovingAverage::new(config.filter_window),
            channels,
            log,
            metrics,
            stats: LoopStats::new(),
            interval: Duration::from_millis(config.interval_ms),
            log_every: config.log_every.max(1),
            cycle_id: 0,
        }
    }

    pub fn stats(&self) -> Arc<LoopStats> {
        Arc::clone(&self.stats)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn metrics(&self) -> &TimingMetrics {
        &self.metrics
    }

    /// Runs one cycle against `plant` and returns what was observed.
    pub fn run_once(&mut self, plant: &mut SimulatedPlant) -> LoopSample {
        self.cycle_id += 1;
        let input = self.filter.push(plant.measure());

        let compute_start = Instant::now();
        let (output, setpoint, mode) = self.controller.with(|pid| {
            let output = pid.compute(input);
            (output, pid.setpoint(), pid.mode())
        });
        self.metrics.record_compute(compute_start.elapsed(), self.interval);

        plant.step(output, self.interval);
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let sample = LoopSample {
            timestamp: Instant::now(),
            cycle_id: self.cycle_id,
            setpoint,
            input,
            output,
            mode,
        };

        match self.channels.sample_tx.try_send(sample) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                self.stats.dropped_samples.fetch_add(1, Ordering::Relaxed);
            }
        }

        if self.cycle_id % self.log_every == 0 {
            self.log.write(format!(
                "[LOOP] cycle #{:<5} input: {:.2}, output: {:.2}, error: {:.2} ({})",
                sample.cycle_id,
                sample.input,
                sample.output,
                sample.error(),
                sample.mode
            ));
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::{ManualClock, Mode, PidController};

    type Fixture = (
        ControlCycle<ManualClock>,
        SharedController<ManualClock>,
        LoopChannels,
        DiagnosticLog,
    );

    fn fixture(config: &LoopConfig) -> Fixture {
        let mut pid = PidController::with_clock(ManualClock::new(1_000));
        pid.set_sample_time(0);
        pid.set_target(10.0);
        pid.set_tunings(1.0, 0.0, 0.0);

        let controller = SharedController::new(pid);
        let channels = LoopChannels::new(config.channel_capacity);
        let log = DiagnosticLog::new(config.log_capacity);
        let cycle = ControlCycle::new(
            controller.clone(),
            channels.clone(),
            log.clone(),
            TimingMetrics::new(),
            config,
        );
        (cycle, controller, channels, log)
    }

    #[test]
    fn run_once_reports_sample_and_moves_plant() {
        let config = LoopConfig::default();
        let (mut cycle, _, channels, _) = fixture(&config);
        let mut plant = SimulatedPlant::new(7, 0.0);

        let sample = cycle.run_once(&mut plant);
        assert_eq!(sample.cycle_id, 1);
        assert_eq!(sample.output, 10.0);
        assert_eq!(sample.mode, Mode::Automatic);
        assert!(plant.value() > 0.0);

        let queued = channels.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].cycle_id, 1);
        assert_eq!(cycle.stats().cycles.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn full_channel_counts_dropped_samples() {
        let config = LoopConfig {
            channel_capacity: 1,
            ..LoopConfig::default()
        };
        let (mut cycle, _, _channels, _) = fixture(&config);
        let mut plant = SimulatedPlant::new(7, 0.0);

        for _ in 0..3 {
            cycle.run_once(&mut plant);
        }
        assert_eq!(cycle.stats().dropped_samples.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn logs_every_nth_cycle_with_mode() {
        let config = LoopConfig {
            log_every: 2,
            ..LoopConfig::default()
        };
        let (mut cycle, controller, _, log) = fixture(&config);
        let mut plant = SimulatedPlant::new(7, 0.0);

        cycle.run_once(&mut plant);
        controller.with(|pid| pid.set_manual_mode(4.0));
        cycle.run_once(&mut plant);

        let entries = log.read_all();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("[LOOP] cycle #2"));
        assert!(entries[0].ends_with("(Manual(4.00))"));
    }
}
