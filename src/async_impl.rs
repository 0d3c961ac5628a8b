pub mod control_task;

pub use control_task::run_control_task;
