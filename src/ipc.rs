//! IPC module - sharing a controller across threads and reporting out of the loop

pub mod channels;
pub mod shared_resource;

pub use channels::{LoopChannels, LoopSample};
pub use shared_resource::{DiagnosticLog, SharedController};
