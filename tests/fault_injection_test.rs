use realtime_pid::{ManualClock, PidController, SimulatedPlant};

fn tuned() -> (PidController<ManualClock>, ManualClock) {
    let clock = ManualClock::new(10_000);
    let mut pid = PidController::with_clock(clock.clone());
    pid.set_target(100.0);
    pid.set_tunings(0.5, 0.1, 0.2);
    (pid, clock)
}

#[test]
fn negative_tunings_leave_prior_tunings_in_place() {
    let (mut pid, _) = tuned();
    let before = (pid.kp(), pid.ki(), pid.kd());

    pid.set_tunings(2.0, -0.1, 2.0);
    pid.set_tunings(-0.0001, 1.0, 1.0);
    pid.set_tunings(1.0, 1.0, f64::NEG_INFINITY);

    assert_eq!((pid.kp(), pid.ki(), pid.kd()), before);
}

#[test]
fn nan_measurement_propagates_through_output() {
    let (mut pid, clock) = tuned();
    assert!(pid.compute(f64::NAN).is_nan());

    // The integral is poisoned too, so later finite inputs stay NaN
    clock.advance(1);
    assert!(pid.compute(50.0).is_nan());
}

#[test]
fn nan_output_is_not_clamped_away() {
    let (mut pid, _) = tuned();
    pid.set_output_limits(-1.0, 1.0);
    assert!(pid.compute(f64::NAN).is_nan());
}

#[test]
fn inverted_limits_resolve_without_panicking() {
    let (mut pid, clock) = tuned();
    pid.set_tunings(1.0, 0.0, 0.0);
    pid.set_output_limits(50.0, 20.0);

    // Above max resolves to max first
    assert_eq!(pid.compute(0.0), 20.0);

    // Below min and not above max resolves to min
    clock.advance(1);
    assert_eq!(pid.compute(100.0), 50.0);
}

#[test]
fn disturbance_is_rejected_by_closed_loop() {
    let clock = ManualClock::new(0);
    let mut pid = PidController::with_clock(clock.clone());
    pid.set_sample_time(10);
    pid.set_output_limits(0.0, 100.0);
    pid.set_target(40.0);
    pid.set_tunings(1.5, 0.01, 0.0);

    let mut plant = SimulatedPlant::new(5, 40.0);
    let dt = std::time::Duration::from_millis(10);

    for _ in 0..500 {
        clock.advance(10);
        let output = pid.compute(plant.measure());
        plant.step(output, dt);
    }

    plant.inject_disturbance(-15.0);
    assert!((plant.value() - 40.0).abs() > 10.0);

    for _ in 0..3000 {
        clock.advance(10);
        let output = pid.compute(plant.measure());
        plant.step(output, dt);
    }

    assert!((plant.value() - 40.0).abs() < 0.5, "settled at {}", plant.value());
}
