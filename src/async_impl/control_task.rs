use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::control_loop::ControlCycle;
use crate::pid::Clock;
use crate::sensor::SimulatedPlant;

/// Drives `cycle` for `cycles` ticks of a tokio interval, then hands the
/// plant back. Stops early if the cycle's shutdown flag is raised.
pub async fn run_control_task<C: Clock>(
    mut cycle: ControlCycle<C>,
    mut plant: SimulatedPlant,
    cycles: u64,
) -> SimulatedPlant {
    let mut interval_timer = interval(cycle.interval());
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let stats = cycle.stats();
    let mut last_tick: Option<Instant> = None;

    for _ in 0..cycles {
        let tick = interval_timer.tick().await;
        if stats.is_shutdown() {
            break;
        }
        if let Some(last) = last_tick {
            cycle.metrics().record_cycle_jitter(tick.duration_since(last));
        }
        last_tick = Some(tick);

        cycle.run_once(&mut plant);
    }

    plant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoopConfig;
    use crate::ipc::{DiagnosticLog, LoopChannels, SharedController};
    use crate::metrics::TimingMetrics;
    use crate::pid::{ManualClock, PidController};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn runs_requested_number_of_cycles() {
        let config = LoopConfig {
            interval_ms: 1,
            ..LoopConfig::default()
        };
        let mut pid = PidController::with_clock(ManualClock::new(0));
        pid.set_sample_time(0);
        pid.set_target(5.0);
        pid.set_tunings(2.0, 0.0, 0.0);

        let channels = LoopChannels::new(64);
        let cycle = ControlCycle::new(
            SharedController::new(pid),
            channels.clone(),
            DiagnosticLog::new(16),
            TimingMetrics::new(),
            &config,
        );
        let stats = cycle.stats();

        let plant = run_control_task(cycle, SimulatedPlant::new(3, 0.0), 20).await;

        assert_eq!(stats.cycles.load(Ordering::Relaxed), 20);
        assert_eq!(channels.drain().len(), 20);
        assert!(plant.value() > 0.0);
    }
}
