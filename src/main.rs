use std::sync::atomic::Ordering;
use std::time::Duration;

use realtime_pid::{
    load_config, spawn_control_loop, DiagnosticLog, LoopChannels, Pid, SharedController,
    SimulatedPlant, SystemClock, SystemConfig, TimingMetrics,
};

const CONFIG_PATH: &str = "config/pid_config.toml";

fn main() {
    println!("===========================================");
    println!("Starting PID Control Loop");
    println!("===========================================\n");

    let cfg = match load_config(CONFIG_PATH) {
        Ok(cfg) => {
            println!("[CONFIG] Loaded {}", CONFIG_PATH);
            cfg
        }
        Err(err) => {
            println!("[CONFIG] {} - using defaults", err);
            SystemConfig::default()
        }
    };

    let mut controller = SharedController::new(cfg.controller.build(SystemClock));
    let snapshot = controller.snapshot();
    println!(
        "[CONFIG] setpoint: {:.2}, kp: {:.4}, ki: {:.4}, kd: {:.4}, sample time: {}ms, limits: [{}, {}], {}",
        snapshot.setpoint,
        snapshot.kp,
        snapshot.ki,
        snapshot.kd,
        snapshot.sample_time_ms,
        snapshot.output_min,
        snapshot.output_max,
        snapshot.direction
    );

    let mut plant = SimulatedPlant::new(42, 20.0).with_noise(0.3);
    plant.gain = 0.6;
    plant.time_constant_s = 3.0;

    let loop_cfg = cfg.control_loop;
    let channels = LoopChannels::new(loop_cfg.channel_capacity);
    let diagnostic_log = DiagnosticLog::new(loop_cfg.log_capacity);
    let metrics = TimingMetrics::new();

    let (handle, stats) = spawn_control_loop(
        controller.clone(),
        plant,
        channels.clone(),
        diagnostic_log.clone(),
        metrics.clone(),
        &loop_cfg,
    );

    let run = Duration::from_secs(loop_cfg.run_secs.max(2));
    println!("System running for {:?}...\n", run);

    // Hold the output by hand for a second midway, then hand back to the controller
    std::thread::sleep(run / 2);
    let held = controller.snapshot().last_output;
    println!("[LOOP] Switching to manual, holding output at {:.2}", held);
    controller.set_manual_mode(held);

    std::thread::sleep(Duration::from_secs(1));
    println!("[LOOP] Resuming automatic control (integral re-seeded from {:.2})", held);
    controller.set_automatic_mode();

    std::thread::sleep(run.saturating_sub(run / 2 + Duration::from_secs(1)));

    println!("\n===========================================");
    println!("Control loop completed - initiating shutdown");
    stats.request_shutdown();

    let plant = match handle.join() {
        Ok(plant) => plant,
        Err(_) => {
            println!("[LOOP] Control thread panicked");
            return;
        }
    };

    let samples = channels.drain();
    let worst_error = samples
        .iter()
        .rev()
        .take(10)
        .map(|s| s.error().abs())
        .fold(0.0_f64, f64::max);

    println!("===========================================");
    println!("FINAL CONTROL LOOP RESULTS");
    println!("===========================================");
    println!("Total Cycles: {}", stats.cycles.load(Ordering::Relaxed));
    println!("Dropped Samples: {}", stats.dropped_samples.load(Ordering::Relaxed));
    println!("Final Process Value: {:.2} (setpoint {:.2})", plant.value(), snapshot.setpoint);
    println!("Worst Error (last 10 samples): {:.2}", worst_error);
    println!("===========================================\n");

    let report = metrics.report();
    println!("=== Performance Metrics ===");
    println!(
        "Compute P50: {:?}, P99: {:?}, Max: {:?} ({} calls, {} overruns)",
        report.compute_p50,
        report.compute_p99,
        report.compute_max,
        report.compute_count,
        report.overruns
    );
    println!("Jitter P50: {:?}, P99: {:?}", report.jitter_p50, report.jitter_p99);

    println!("\n=== Diagnostic Log (last 5) ===");
    let entries = diagnostic_log.read_all();
    for entry in entries.iter().skip(entries.len().saturating_sub(5)) {
        println!("{}", entry);
    }
}
