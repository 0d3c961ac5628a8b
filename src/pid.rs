//! PID module - controller state machine, operating modes and time sources

pub mod clock;
pub mod controller;

use serde::Deserialize;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ControllerSnapshot, PidController};

// ============================================================================
// MODE - Automatic computation or a held manual output
// ============================================================================

/// Operating mode of a controller.
///
/// In `Manual` the controller stops computing and hands back the carried
/// output value verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Automatic,
    Manual(f64),
}

impl Mode {
    pub fn is_manual(&self) -> bool {
        matches!(self, Mode::Manual(_))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Automatic => write!(f, "Automatic"),
            Mode::Manual(value) => write!(f, "Manual({:.2})", value),
        }
    }
}

// ============================================================================
// DIRECTION - Relation between output and process value
// ============================================================================

/// Whether raising the output raises (`Direct`) or lowers (`Reverse`) the
/// process value. A heater is direct acting, a chiller is reverse acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Direct,
    Reverse,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Direct => write!(f, "Direct"),
            Direction::Reverse => write!(f, "Reverse"),
        }
    }
}

// ============================================================================
// PID INTERFACE - Shared by owned and lock-guarded controllers
// ============================================================================

/// Operations a host control loop drives a controller with.
pub trait Pid {
    /// Computes the output to apply for the latest measurement.
    fn compute(&mut self, input: f64) -> f64;

    /// Sets the tuning constants in per-millisecond units. Calls with any
    /// negative constant are ignored.
    fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64);

    /// Sets the minimum interval between two recalculations.
    fn set_sample_time(&mut self, sample_time_ms: i64);

    fn set_output_limits(&mut self, min: f64, max: f64);

    /// Resumes automatic computation without a jump in the output.
    fn set_automatic_mode(&mut self);

    /// Stops computing and returns `output` from every `compute` call.
    fn set_manual_mode(&mut self, output: f64);

    fn set_direction(&mut self, direction: Direction);

    fn set_target(&mut self, target: f64);
}
