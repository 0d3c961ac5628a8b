// Noise reduction (moving average) for measurements fed to a controller
use std::collections::VecDeque;

pub struct MovingAverage {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self { window, buf: VecDeque::with_capacity(window), sum: 0.0 }
    }

    /// Adds a sample and returns the mean of the current window.
    pub fn push(&mut self, x: f64) -> f64 {
        self.buf.push_back(x);
        self.sum += x;
        if self.buf.len() > self.window {
            if let Some(old) = self.buf.pop_front() { self.sum -= old; }
        }
        self.sum / self.buf.len() as f64
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn averages_over_the_window_only() {
        let mut avg = MovingAverage::new(3);
        assert_relative_eq!(avg.push(3.0), 3.0);
        assert_relative_eq!(avg.push(6.0), 4.5);
        assert_relative_eq!(avg.push(9.0), 6.0);
        assert_relative_eq!(avg.push(12.0), 9.0);

        avg.reset();
        assert_relative_eq!(avg.push(1.0), 1.0);
    }

    #[test]
    fn zero_window_behaves_as_passthrough() {
        let mut avg = MovingAverage::new(0);
        assert_relative_eq!(avg.push(5.0), 5.0);
        assert_relative_eq!(avg.push(-2.0), -2.0);
    }
}
