use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::config::LoopConfig;
use crate::control_loop::{ControlCycle, LoopStats};
use crate::ipc::{DiagnosticLog, LoopChannels, SharedController};
use crate::metrics::TimingMetrics;
use crate::pid::Clock;
use crate::sensor::SimulatedPlant;

/// Runs the controller against `plant` on a dedicated thread, one cycle per
/// configured interval, until `LoopStats::shutdown` is set.
///
/// The thread hands the plant back when it exits.
pub fn spawn_control_loop<C>(
    controller: SharedController<C>,
    mut plant: SimulatedPlant,
    channels: LoopChannels,
    diagnostic_log: DiagnosticLog,
    metrics: TimingMetrics,
    config: &LoopConfig,
) -> (thread::JoinHandle<SimulatedPlant>, Arc<LoopStats>)
where
    C: Clock + Send + 'static,
{
    let mut cycle = ControlCycle::new(controller, channels, diagnostic_log.clone(), metrics, config);
    let stats = cycle.stats();
    let interval = cycle.interval();
    let thread_stats = Arc::clone(&stats);

    let handle = thread::spawn(move || {
        diagnostic_log.write(format!("[LOOP] Control thread started ({:?} interval)", interval));
        let mut last_cycle_start: Option<Instant> = None;

        loop {
            if thread_stats.is_shutdown() {
                diagnostic_log.write("[LOOP] Control thread shutting down".to_string());
                break;
            }

            let cycle_start = Instant::now();
            if let Some(last) = last_cycle_start {
                cycle.metrics().record_cycle_jitter(cycle_start.duration_since(last));
            }
            last_cycle_start = Some(cycle_start);

            cycle.run_once(&mut plant);

            // Sleep to hold the cycle period
            let elapsed = cycle_start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }

        plant
    });

    (handle, stats)
}
