use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::pid::{Clock, ControllerSnapshot, Direction, Pid, PidController, SystemClock};

// ============================================================================
// SHARED CONTROLLER - One controller, many callers, one lock
// ============================================================================

/// Cloneable handle to a controller guarded by a single mutex.
///
/// Every call is one critical section, so a setter can never interleave with
/// a `compute` step half way through.
pub struct SharedController<C: Clock = SystemClock> {
    inner: Arc<Mutex<PidController<C>>>,
}

impl<C: Clock> Clone for SharedController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedController<C> {
    pub fn new(controller: PidController<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Runs `f` with exclusive access, for reconfigurations that must land
    /// together.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PidController<C>) -> R,
    {
        let mut controller = self.inner.lock();
        f(&mut *controller)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().snapshot()
    }
}

impl<C: Clock> Pid for SharedController<C> {
    fn compute(&mut self, input: f64) -> f64 {
        self.inner.lock().compute(input)
    }

    fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) {
        self.inner.lock().set_tunings(kp, ki, kd);
    }

    fn set_sample_time(&mut self, sample_time_ms: i64) {
        self.inner.lock().set_sample_time(sample_time_ms);
    }

    fn set_output_limits(&mut self, min: f64, max: f64) {
        self.inner.lock().set_output_limits(min, max);
    }

    fn set_automatic_mode(&mut self) {
        self.inner.lock().set_automatic_mode();
    }

    fn set_manual_mode(&mut self, output: f64) {
        self.inner.lock().set_manual_mode(output);
    }

    fn set_direction(&mut self, direction: Direction) {
        self.inner.lock().set_direction(direction);
    }

    fn set_target(&mut self, target: f64) {
        self.inner.lock().set_target(target);
    }
}

// ============================================================================
// DIAGNOSTIC LOG - Bounded, thread-safe message log
// ============================================================================

#[derive(Clone)]
pub struct DiagnosticLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl DiagnosticLog {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    /// Appends a message, dropping the oldest once the log is full.
    pub fn write(&self, message: String) {
        let mut log = self.entries.write();
        log.push_back(message);
        if log.len() > self.max_size {
            log.pop_front();
        }
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
