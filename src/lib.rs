pub mod pid;
pub mod config;
pub mod error;
pub mod ipc;
pub mod sensor;
pub mod metrics;
pub mod control_loop;
pub mod threaded_impl;
pub mod async_impl;

pub use pid::{Clock, ControllerSnapshot, Direction, ManualClock, Mode, Pid, PidController, SystemClock};
pub use config::{load_config, load_config_or_default, ControllerConfig, LoopConfig, SystemConfig};
pub use error::ConfigError;
pub use ipc::{DiagnosticLog, LoopChannels, LoopSample, SharedController};
pub use sensor::{MovingAverage, SimulatedPlant};
pub use metrics::{MetricsReport, TimingMetrics};
pub use control_loop::{ControlCycle, LoopStats};
pub use threaded_impl::spawn_control_loop;
pub use async_impl::run_control_task;
