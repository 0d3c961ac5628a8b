use crossbeam::channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use crate::pid::Mode;

/// One control-loop cycle as seen by observers.
#[derive(Clone, Copy, Debug)]
pub struct LoopSample {
    pub timestamp: Instant,
    pub cycle_id: u64,
    pub setpoint: f64,
    pub input: f64,
    pub output: f64,
    pub mode: Mode,
}

impl LoopSample {
    pub fn error(&self) -> f64 {
        self.setpoint - self.input
    }
}

#[derive(Clone)]
pub struct LoopChannels {
    // Loop -> observers
    pub sample_tx: Sender<LoopSample>,
    pub sample_rx: Arc<Receiver<LoopSample>>,
}

impl LoopChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (sample_tx, sample_rx) = bounded(buffer_size);

        Self {
            sample_tx,
            sample_rx: Arc::new(sample_rx),
        }
    }

    /// Collects everything currently queued without blocking.
    pub fn drain(&self) -> Vec<LoopSample> {
        self.sample_rx.try_iter().collect()
    }
}
