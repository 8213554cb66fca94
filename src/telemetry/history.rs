//! Bounded SINR sample history.

use std::collections::VecDeque;

/// Default number of samples kept per terminal
pub const SINR_HISTORY_CAPACITY: usize = 1000;

/// Fixed-capacity FIFO window of the most recent SINR samples (dB).
///
/// Pushing onto a full window evicts the oldest sample in O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct SinrHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for SinrHistory {
    fn default() -> Self {
        Self::with_capacity(SINR_HISTORY_CAPACITY)
    }
}

impl SinrHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample_db: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample_db);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.samples.iter()
    }

    /// Mean of the samples in the window, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Bessel-corrected sample standard deviation, 0 with fewer than two samples
    pub fn std_dev(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let sum_sq: f64 = self.samples.iter().map(|s| (s - mean) * (s - mean)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    }
}
