//! Configuration loading for the controller and the host loop

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::pid::{Clock, Direction, PidController};

// ============================================================================
// CONTROLLER CONFIG - Tunings, limits and initial mode
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint: f64,
    pub sample_time_ms: i64,
    pub output_min: f64,
    pub output_max: f64,
    pub direction: Direction,
    /// Starts the controller in manual mode holding this output.
    pub manual_output: Option<f64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            sample_time_ms: 1,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            direction: Direction::Direct,
            manual_output: None,
        }
    }
}

impl ControllerConfig {
    /// Builds a controller reading time from `clock`.
    ///
    /// Sample time and direction go in before the tunings so the effective
    /// constants come out scaled and signed exactly once.
    pub fn build<C: Clock>(&self, clock: C) -> PidController<C> {
        let mut pid = PidController::with_clock(clock);
        pid.set_sample_time(self.sample_time_ms);
        pid.set_direction(self.direction);
        pid.set_tunings(self.kp, self.ki, self.kd);
        pid.set_output_limits(self.output_min, self.output_max);
        pid.set_target(self.setpoint);
        if let Some(output) = self.manual_output {
            pid.set_manual_mode(output);
        }
        pid
    }
}

// ============================================================================
// LOOP CONFIG - Host loop timing and buffer sizes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub interval_ms: u64,
    pub run_secs: u64,
    pub log_capacity: usize,
    pub channel_capacity: usize,
    /// Moving-average window applied to measurements; 1 disables smoothing.
    pub filter_window: usize,
    /// Write a diagnostic entry every this many cycles.
    pub log_every: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10,
            run_secs: 5,
            log_capacity: 2000,
            channel_capacity: 256,
            filter_window: 1,
            log_every: 10,
        }
    }
}

// ============================================================================
// SYSTEM CONFIG - File root
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub controller: ControllerConfig,
    #[serde(rename = "loop")]
    pub control_loop: LoopConfig,
}

impl SystemConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SystemConfig, ConfigError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;

    SystemConfig::from_toml_str(&source).map_err(|source| ConfigError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

/// Like [`load_config`], but any failure yields the defaults.
pub fn load_config_or_default(path: impl AsRef<Path>) -> SystemConfig {
    load_config(path).unwrap_or_default()
}
