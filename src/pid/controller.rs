use super::clock::{Clock, SystemClock};
use super::{Direction, Mode, Pid};

#[cfg(feature = "defmt-log")]
use defmt::debug;

/// Discrete-time PID controller.
///
/// The stored `kp`, `ki` and `kd` are effective constants: `ki` and `kd` are
/// scaled by the sample time, and all three carry the sign of the current
/// direction.
#[derive(Clone, Debug)]
pub struct PidController<C: Clock = SystemClock> {
    clock: C,

    // Effective gains
    kp: f64,
    ki: f64,
    kd: f64,

    // State
    setpoint: f64,
    integral: f64,
    last_input: f64,
    last_output: f64,
    last_time_ms: i64,

    // Configuration
    sample_time_ms: i64,
    output_min: f64,
    output_max: f64,
    mode: Mode,
    direction: Direction,
}

/// Observable state of a controller at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub struct ControllerSnapshot {
    pub setpoint: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral: f64,
    pub last_output: f64,
    pub sample_time_ms: i64,
    pub output_min: f64,
    pub output_max: f64,
    pub mode: Mode,
    pub direction: Direction,
}

impl PidController<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PidController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PidController<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            integral: 0.0,
            last_input: 0.0,
            last_output: 0.0,
            last_time_ms: 0,
            sample_time_ms: 1,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            mode: Mode::Automatic,
            direction: Direction::Direct,
        }
    }

    /// Computes the output for `input`.
    ///
    /// In manual mode the manual output is returned untouched. When less than
    /// one sample time has passed since the last accepted step, the previous
    /// output is returned and nothing is updated.
    pub fn compute(&mut self, input: f64) -> f64 {
        if let Mode::Manual(output) = self.mode {
            return output;
        }

        // Wrapping: a clock jump across the i64 range must not panic
        let now = self.clock.now_ms();
        if now.wrapping_sub(self.last_time_ms) < self.sample_time_ms {
            return self.last_output;
        }

        let error = self.setpoint - input;

        // Integral term with anti-windup
        self.integral += self.ki * error;
        self.integral = clamp_output(self.integral, self.output_min, self.output_max);

        // Derivative on measurement, so setpoint steps don't kick the output
        let d_input = input - self.last_input;

        let output = self.kp * error + self.integral - self.kd * d_input;
        let output = clamp_output(output, self.output_min, self.output_max);

        self.last_input = input;
        self.last_time_ms = now;
        self.last_output = output;

        output
    }

    /// Sets the tuning constants. Ignored as a whole if any constant is
    /// negative.
    pub fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) {
        if kp < 0.0 || ki < 0.0 || kd < 0.0 {
            return;
        }

        let sample_time = if self.sample_time_ms == 0 {
            1.0
        } else {
            self.sample_time_ms as f64
        };

        self.kp = kp;
        self.ki = ki * sample_time;
        self.kd = kd / sample_time;

        if self.direction == Direction::Reverse {
            self.negate_gains();
        }
    }

    /// Changes the sample time, rescaling the effective `ki` and `kd` so the
    /// previously set tunings keep their meaning.
    pub fn set_sample_time(&mut self, sample_time_ms: i64) {
        if self.sample_time_ms > 0 {
            let ratio = sample_time_ms as f64 / self.sample_time_ms as f64;
            self.ki *= ratio;
            self.kd /= ratio;
        }

        self.sample_time_ms = sample_time_ms;
    }

    /// Stores new output bounds. Bounds are not checked against each other and
    /// are applied from the next accepted step on.
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        self.output_min = min;
        self.output_max = max;
    }

    pub fn set_automatic_mode(&mut self) {
        if self.mode.is_manual() {
            // Bumpless transfer: the integral picks up from the last computed output
            self.integral = clamp_output(self.last_output, self.output_min, self.output_max);

            #[cfg(feature = "defmt-log")]
            debug!("[PID] automatic, integral re-seeded to {}", self.integral);
        }

        self.mode = Mode::Automatic;
    }

    pub fn set_manual_mode(&mut self, output: f64) {
        #[cfg(feature = "defmt-log")]
        debug!("[PID] manual, holding {}", output);

        self.mode = Mode::Manual(output);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            self.negate_gains();

            #[cfg(feature = "defmt-log")]
            debug!("[PID] direction {} -> {}", self.direction, direction);
        }

        self.direction = direction;
    }

    pub fn set_target(&mut self, target: f64) {
        self.setpoint = target;
    }

    fn negate_gains(&mut self) {
        self.kp = -self.kp;
        self.ki = -self.ki;
        self.kd = -self.kd;
    }

    /// Effective proportional constant.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Effective integral constant, scaled by the sample time.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Effective derivative constant, scaled by the sample time.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sample_time(&self) -> i64 {
        self.sample_time_ms
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.output_min, self.output_max)
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            setpoint: self.setpoint,
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            integral: self.integral,
            last_output: self.last_output,
            sample_time_ms: self.sample_time_ms,
            output_min: self.output_min,
            output_max: self.output_max,
            mode: self.mode,
            direction: self.direction,
        }
    }
}

impl<C: Clock> Pid for PidController<C> {
    fn compute(&mut self, input: f64) -> f64 {
        PidController::compute(self, input)
    }

    fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) {
        PidController::set_tunings(self, kp, ki, kd)
    }

    fn set_sample_time(&mut self, sample_time_ms: i64) {
        PidController::set_sample_time(self, sample_time_ms)
    }

    fn set_output_limits(&mut self, min: f64, max: f64) {
        PidController::set_output_limits(self, min, max)
    }

    fn set_automatic_mode(&mut self) {
        PidController::set_automatic_mode(self)
    }

    fn set_manual_mode(&mut self, output: f64) {
        PidController::set_manual_mode(self, output)
    }

    fn set_direction(&mut self, direction: Direction) {
        PidController::set_direction(self, direction)
    }

    fn set_target(&mut self, target: f64) {
        PidController::set_target(self, target)
    }
}

/// Upper bound first, then lower bound. Unlike `f64::clamp` this never
/// panics, including when `min > max` or a bound is NaN.
fn clamp_output(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}
