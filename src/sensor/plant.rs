use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// First-order process with a noisy sensor, for exercising a controller
/// without hardware.
///
/// Each step moves the process value toward `ambient + gain * output` with
/// time constant `time_constant_s`.
pub struct SimulatedPlant {
    rng: StdRng,
    value: f64,
    pub ambient: f64,
    pub gain: f64,
    pub time_constant_s: f64,
    pub noise_amplitude: f64,
}

impl SimulatedPlant {
    pub fn new(seed: u64, initial: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            value: initial,
            ambient: initial,
            gain: 1.0,
            time_constant_s: 1.0,
            noise_amplitude: 0.0,
        }
    }

    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude.abs();
        self
    }

    /// Applies `output` for `dt` and returns the new true process value.
    pub fn step(&mut self, output: f64, dt: Duration) -> f64 {
        let dt = dt.as_secs_f64();
        let tau = self.time_constant_s.max(f64::EPSILON);
        let target = self.ambient + self.gain * output;
        self.value += (target - self.value) * (dt / tau).min(1.0);
        self.value
    }

    /// Reads the sensor: the true value plus uniform noise.
    pub fn measure(&mut self) -> f64 {
        if self.noise_amplitude > 0.0 {
            self.value + self.rng.gen_range(-self.noise_amplitude..self.noise_amplitude)
        } else {
            self.value
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn inject_disturbance(&mut self, delta: f64) {
        self.value += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn settles_at_ambient_plus_gain_times_output() {
        let mut plant = SimulatedPlant::new(1, 20.0);
        plant.gain = 2.0;

        for _ in 0..200 {
            plant.step(10.0, Duration::from_millis(100));
        }
        assert_relative_eq!(plant.value(), 40.0, epsilon = 1e-6);
    }

    #[test]
    fn noise_stays_within_amplitude() {
        let mut plant = SimulatedPlant::new(42, 50.0).with_noise(2.0);
        for _ in 0..100 {
            let reading = plant.measure();
            assert!((reading - 50.0).abs() < 2.0);
        }
    }

    #[test]
    fn disturbance_shifts_the_process_value() {
        let mut plant = SimulatedPlant::new(1, 0.0);
        plant.inject_disturbance(5.0);
        assert_eq!(plant.measure(), 5.0);
    }
}
