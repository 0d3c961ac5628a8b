//! Sensor module - simulated process and measurement smoothing for host loops

pub mod filter;
pub mod plant;

pub use filter::MovingAverage;
pub use plant::SimulatedPlant;
